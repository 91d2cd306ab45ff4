/// Authentication endpoints
///
/// - `POST /api/auth/register` - Create an account and get tokens
/// - `POST /api/auth/login` - Exchange username and password for tokens
/// - `POST /api/auth/refresh` - Exchange a refresh token for an access token
///
/// Access tokens are sent back as `Authorization: Bearer <token>` on every
/// other `/api` route.

use crate::{
    app::AppState,
    error::ApiResult,
};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tidytask_shared::{
    models::User,
    service::{Registration, TokenPair},
};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Register request, shared with the registration form
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Length is counted after trimming, which is the value stored
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,

    /// Strength rules are checked by the account service
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,
}

const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 64;

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.trim().chars().count();
    if (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Ok(());
    }
    Err(ValidationError::new("length").with_message("Username must be 3 to 64 characters".into()))
}

impl RegisterRequest {
    /// Trims every field; blank names become absent
    pub fn into_registration(self) -> Registration {
        let name = |raw: Option<String>| {
            raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };

        Registration {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
            first_name: name(self.first_name),
            last_name: name(self.last_name),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Public user fields
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Register and login response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,

    pub token_type: &'static str,

    /// Access token lifetime in seconds
    pub expires_in: i64,
}

impl AuthResponse {
    fn new(user: &User, tokens: TokenPair) -> Self {
        Self {
            user: UserResponse::from(user),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// Register a new user
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "username": "jane",
///   "email": "jane@example.com",
///   "password": "SecureP@ss123",
///   "first_name": "Jane"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: malformed JSON
/// - `409 Conflict`: username or email already taken
/// - `422 Unprocessable Entity`: field validation or password strength failed
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let Json(req) = payload?;
    req.validate()?;

    let user = state.accounts.register(req.into_registration()).await?;
    let tokens = state.accounts.issue_tokens(&user)?;

    Ok((StatusCode::CREATED, Json(AuthResponse::new(&user, tokens))))
}

/// Login with username and password
///
/// # Errors
///
/// - `401 Unauthorized`: unknown user or wrong password
/// - `403 Forbidden`: account disabled
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(req) = payload?;

    let user = state
        .accounts
        .authenticate(req.username.trim(), &req.password)
        .await?;
    let tokens = state.accounts.issue_tokens(&user)?;

    Ok(Json(AuthResponse::new(&user, tokens)))
}

/// Exchange a refresh token for a new access token
///
/// # Errors
///
/// - `401 Unauthorized`: invalid or expired refresh token, or an access token
///   sent in its place
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<Json<RefreshResponse>> {
    let Json(req) = payload?;

    let (access_token, claims) = state.accounts.refresh(&req.refresh_token).await?;

    Ok(Json(RefreshResponse {
        access_token,
        token_type: "Bearer",
        expires_in: claims.expires_in(),
    }))
}
