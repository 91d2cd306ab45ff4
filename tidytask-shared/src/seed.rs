/// First-run data
///
/// On an empty user table the server creates an administrator and gives
/// them a starter set of categories. Any later start is a no-op.

use tracing::{info, warn};

use crate::auth::password::hash_password;
use crate::error::StoreError;
use crate::models::{CreateCategory, CreateUser, User};
use crate::store::Store;

/// Starter categories and their colors
pub const DEFAULT_CATEGORIES: [(&str, &str); 5] = [
    ("Work", "#dc3545"),
    ("Personal", "#28a745"),
    ("Shopping", "#ffc107"),
    ("Health", "#17a2b8"),
    ("Learning", "#6f42c1"),
];

/// Credentials for the seeded administrator
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Default for AdminAccount {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            email: "admin@todoapp.com".to_string(),
            password: "admin123".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] crate::auth::password::PasswordError),
}

/// Seeds the administrator when no user exists yet
///
/// Returns the created user, or `None` if the store already had users.
/// The administrator password is not subject to registration strength rules.
pub async fn seed_admin(store: &dyn Store, admin: &AdminAccount) -> Result<Option<User>, SeedError> {
    if store.count_users().await? > 0 {
        return Ok(None);
    }

    let user = store
        .create_user(CreateUser {
            username: admin.username.clone(),
            email: admin.email.clone(),
            password_hash: hash_password(&admin.password)?,
            first_name: Some("Admin".to_string()),
            last_name: Some("User".to_string()),
            is_active: true,
        })
        .await?;
    info!(username = %user.username, "Created default admin user");

    for (name, color) in DEFAULT_CATEGORIES {
        if let Err(e) = store
            .create_category(CreateCategory::new(user.id, name, Some(color)))
            .await
        {
            warn!(category = name, error = %e, "Failed to create default category");
        }
    }
    info!(count = DEFAULT_CATEGORIES.len(), "Created default categories");

    Ok(Some(user))
}
