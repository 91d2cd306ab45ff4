/// Session tokens
///
/// HS256-signed JWTs carrying the user id and username. Two kinds exist:
///
/// - **access** (24 h): sent as a bearer token or held in the UI session cookie
/// - **refresh** (30 d): only exchanged for a new access token
///
/// The issuer is always `tidytask`; signature, expiry, not-before and issuer
/// are checked on every validation. Secrets should be at least 32 bytes.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthContext;

pub const ISSUER: &str = "tidytask";

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    Create(String),

    #[error("Token has expired")]
    Expired,

    /// Bad signature, wrong issuer, malformed, or not yet valid
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// A valid token of the other kind
    #[error("Expected {expected} token")]
    WrongType { expected: TokenType },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn lifetime(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(24),
            TokenType::Refresh => Duration::days(30),
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,

    pub username: String,

    pub iss: String,

    pub iat: i64,

    pub exp: i64,

    pub nbf: i64,

    pub token_type: TokenType,
}

impl Claims {
    /// Claims for `user` with the default lifetime of `token_type`
    pub fn new(user: &AuthContext, token_type: TokenType) -> Self {
        Self::with_lifetime(user, token_type, token_type.lifetime())
    }

    pub fn with_lifetime(user: &AuthContext, token_type: TokenType, lifetime: Duration) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub: user.user_id,
            username: user.username.clone(),
            iss: ISSUER.to_string(),
            iat: now,
            exp: now + lifetime.num_seconds(),
            nbf: now,
            token_type,
        }
    }

    /// Seconds until expiry, as reported to clients
    pub fn expires_in(&self) -> i64 {
        (self.exp - Utc::now().timestamp()).max(0)
    }

    pub fn context(&self) -> AuthContext {
        AuthContext {
            user_id: self.sub,
            username: self.username.clone(),
        }
    }
}

pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::Create(e.to_string()))
}

/// Checks signature and time claims, regardless of token type
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_nbf = true;
    validation.leeway = 0;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid(e.to_string()),
        })
}

fn validate_typed(token: &str, secret: &str, expected: TokenType) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;
    if claims.token_type != expected {
        return Err(JwtError::WrongType { expected });
    }
    Ok(claims)
}

pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    validate_typed(token, secret, TokenType::Access)
}

pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    validate_typed(token, secret, TokenType::Refresh)
}

/// Issues a new access token for the holder of a valid refresh token
pub fn refresh_access_token(refresh_token: &str, secret: &str) -> Result<(String, Claims), JwtError> {
    let refresh = validate_refresh_token(refresh_token, secret)?;
    let claims = Claims::new(&refresh.context(), TokenType::Access);
    let token = create_token(&claims, secret)?;
    Ok((token, claims))
}
