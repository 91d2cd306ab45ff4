/// JSON API route handlers
///
/// - `health`: service and store status
/// - `auth`: register, login, refresh
/// - `tasks`: task CRUD, toggle, clear completed
/// - `categories`: category list, create, delete
/// - `stats`: task statistics

pub mod auth;
pub mod categories;
pub mod health;
pub mod stats;
pub mod tasks;

use crate::error::ApiError;
use serde::Serialize;
use uuid::Uuid;

/// `{"message": "..."}` body of operations without a resource to return
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parses a path id; anything that is not a UUID cannot name a record
pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("{what} not found")))
}
