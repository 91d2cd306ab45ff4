/// Error handling for the JSON API
///
/// Handlers return `ApiResult<T>`; every shared error type converts into
/// [`ApiError`], which renders as a status code plus a JSON body:
///
/// ```json
/// { "error": "not_found", "message": "Task not found" }
/// ```
///
/// Store and other internal failures are logged and reported with a
/// generic message; their details never reach the client.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tidytask_shared::{
    auth::jwt::JwtError,
    error::{StoreError, TaskError},
    service::AccountError,
};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400: malformed body or invalid field
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 401: missing, invalid or expired credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 403: valid credentials, account not allowed in
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404: missing or owned by another user
    #[error("Not found: {0}")]
    NotFound(String),

    /// 409: duplicate username, email or category
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 422: request shape rejected by `validator`
    #[error("Validation failed: {} errors", .0.len())]
    ValidationError(Vec<ValidationErrorDetail>),

    /// 500: logged, never detailed to the client
    #[error("Internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable code, e.g. `bad_request`
    pub error: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::ValidationError(_) => "validation_error",
            ApiError::InternalError(_) => "internal_error",
        }
    }

    /// User-facing message; internal details are replaced
    pub fn public_message(&self) -> String {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => msg.clone(),
            ApiError::ValidationError(errors) => errors
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "Request validation failed".to_string()),
            ApiError::InternalError(_) => "An internal error occurred".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::InternalError(ref msg) = self {
            tracing::error!(error = %msg, "Internal error");
        }

        let status = self.status();
        let error = self.code().to_string();
        let (message, details) = match self {
            ApiError::ValidationError(errors) => {
                ("Request validation failed".to_string(), Some(errors))
            }
            other => (other.public_message(), None),
        };

        (
            status,
            Json(ErrorResponse {
                error,
                message,
                details,
            }),
        )
            .into_response()
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::Validation(msg) => ApiError::BadRequest(msg),
            TaskError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            TaskError::Conflict(msg) => ApiError::Conflict(msg),
            TaskError::Store(e) => e.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid username or password".to_string())
            }
            AccountError::Inactive => ApiError::Forbidden("Account is disabled".to_string()),
            AccountError::UsernameTaken | AccountError::EmailTaken => {
                ApiError::Conflict(err.to_string())
            }
            AccountError::WeakPassword(msg) => ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "password".to_string(),
                message: msg.to_string(),
            }]),
            AccountError::StaleSession => ApiError::Unauthorized(err.to_string()),
            AccountError::Token(e) => e.into(),
            AccountError::Password(e) => {
                ApiError::InternalError(format!("Password operation failed: {e}"))
            }
            AccountError::Store(e) => e.into(),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::Create(msg) => ApiError::InternalError(format!("Token creation failed: {msg}")),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {field}")),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(details)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
