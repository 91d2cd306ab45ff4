/// Authentication primitives
///
/// - `password`: Argon2id hashing and registration strength rules
/// - `jwt`: HS256 access/refresh tokens
///
/// Front ends turn a credential into an [`AuthContext`] and hand it to every
/// domain operation; nothing below the front end reads ambient identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod jwt;
pub mod password;

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
}

impl From<&crate::models::User> for AuthContext {
    fn from(user: &crate::models::User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
        }
    }
}
