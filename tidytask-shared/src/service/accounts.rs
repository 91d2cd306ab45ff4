/// Registration, login and session resolution
///
/// Credentials are checked here; the front ends only translate the outcome
/// into a response. Login failures never reveal whether the username
/// exists.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::auth::jwt::{self, Claims, JwtError, TokenType};
use crate::auth::password::{self, PasswordError};
use crate::auth::AuthContext;
use crate::error::StoreError;
use crate::models::{CreateUser, User};
use crate::store::{constraints, Store};

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account is disabled")]
    Inactive,

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Email already registered")]
    EmailTaken,

    #[error("{0}")]
    WeakPassword(&'static str),

    /// The token is valid but its user no longer exists or was disabled
    #[error("Session is no longer valid")]
    StaleSession,

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// New account details, already shape-checked by the caller
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Tokens handed out on login or registration
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    jwt_secret: Arc<str>,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, jwt_secret: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Creates an active account
    ///
    /// # Errors
    ///
    /// `WeakPassword`, `UsernameTaken` or `EmailTaken` before anything is
    /// written.
    pub async fn register(&self, data: Registration) -> Result<User, AccountError> {
        password::validate_password_strength(&data.password).map_err(AccountError::WeakPassword)?;

        if self.store.find_user_by_username(&data.username).await?.is_some() {
            return Err(AccountError::UsernameTaken);
        }
        if self.store.find_user_by_email(&data.email).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        let password_hash = password::hash_password(&data.password)?;
        let user = self
            .store
            .create_user(CreateUser {
                username: data.username,
                email: data.email,
                password_hash,
                first_name: data.first_name,
                last_name: data.last_name,
                is_active: true,
            })
            .await
            .map_err(|e| match e.constraint() {
                Some(constraints::USERS_USERNAME) => AccountError::UsernameTaken,
                Some(constraints::USERS_EMAIL) => AccountError::EmailTaken,
                _ => AccountError::Store(e),
            })?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Checks a username/password pair
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AccountError> {
        let Some(user) = self.store.find_user_by_username(username).await? else {
            warn!(username, "Login attempt for unknown user");
            return Err(AccountError::InvalidCredentials);
        };

        if !password::verify_password(password, &user.password_hash)? {
            warn!(username, "Login attempt with wrong password");
            return Err(AccountError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AccountError::Inactive);
        }

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    pub fn issue_tokens(&self, user: &User) -> Result<TokenPair, AccountError> {
        let ctx = AuthContext::from(user);
        let access = Claims::new(&ctx, TokenType::Access);
        let refresh = Claims::new(&ctx, TokenType::Refresh);

        Ok(TokenPair {
            access_token: jwt::create_token(&access, &self.jwt_secret)?,
            refresh_token: jwt::create_token(&refresh, &self.jwt_secret)?,
            token_type: "Bearer",
            expires_in: access.expires_in(),
        })
    }

    /// Exchanges a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<(String, Claims), AccountError> {
        let claims = jwt::validate_refresh_token(refresh_token, &self.jwt_secret)?;
        self.ensure_active(&claims).await?;
        Ok(jwt::refresh_access_token(refresh_token, &self.jwt_secret)?)
    }

    /// Resolves an access token to the caller it was issued to
    ///
    /// Users that were removed or disabled after the token was issued are
    /// rejected.
    pub async fn resolve_session(&self, access_token: &str) -> Result<AuthContext, AccountError> {
        let claims = jwt::validate_access_token(access_token, &self.jwt_secret)?;
        let user = self.ensure_active(&claims).await?;
        Ok(AuthContext::from(&user))
    }

    async fn ensure_active(&self, claims: &Claims) -> Result<User, AccountError> {
        match self.store.find_user_by_id(claims.sub).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AccountError::StaleSession),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn service() -> AccountService {
        AccountService::new(Arc::new(MemoryStore::new()), SECRET)
    }

    fn registration(username: &str, email: &str) -> Registration {
        Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: "Str0ng!Pass".to_string(),
            first_name: Some("Alice".to_string()),
            last_name: None,
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let svc = service();
        let user = svc
            .register(registration("alice", "alice@example.com"))
            .await
            .unwrap();
        assert!(user.password_hash.starts_with("$argon2id$"));

        let logged_in = svc.authenticate("alice", "Str0ng!Pass").await.unwrap();
        assert_eq!(logged_in.id, user.id);

        assert!(matches!(
            svc.authenticate("alice", "wrong").await,
            Err(AccountError::InvalidCredentials)
        ));
        assert!(matches!(
            svc.authenticate("nobody", "Str0ng!Pass").await,
            Err(AccountError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_duplicates() {
        let svc = service();
        svc.register(registration("alice", "alice@example.com"))
            .await
            .unwrap();

        assert!(matches!(
            svc.register(registration("alice", "other@example.com")).await,
            Err(AccountError::UsernameTaken)
        ));
        assert!(matches!(
            svc.register(registration("bob", "alice@example.com")).await,
            Err(AccountError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn test_register_weak_password() {
        let svc = service();
        let mut data = registration("alice", "alice@example.com");
        data.password = "password".to_string();

        assert!(matches!(
            svc.register(data).await,
            Err(AccountError::WeakPassword(_))
        ));
    }

    #[tokio::test]
    async fn test_tokens_resolve_to_user() {
        let svc = service();
        let user = svc
            .register(registration("alice", "alice@example.com"))
            .await
            .unwrap();

        let tokens = svc.issue_tokens(&user).unwrap();
        assert_eq!(tokens.token_type, "Bearer");

        let ctx = svc.resolve_session(&tokens.access_token).await.unwrap();
        assert_eq!(ctx.user_id, user.id);
        assert_eq!(ctx.username, "alice");

        assert!(svc.resolve_session(&tokens.refresh_token).await.is_err());

        let (access, claims) = svc.refresh(&tokens.refresh_token).await.unwrap();
        assert_eq!(claims.sub, user.id);
        assert!(svc.resolve_session(&access).await.is_ok());
    }

    #[tokio::test]
    async fn test_inactive_user_cannot_log_in() {
        let store = Arc::new(MemoryStore::new());
        let svc = AccountService::new(store.clone(), SECRET);
        store
            .create_user(CreateUser {
                username: "ghost".to_string(),
                email: "ghost@example.com".to_string(),
                password_hash: password::hash_password("Str0ng!Pass").unwrap(),
                first_name: None,
                last_name: None,
                is_active: false,
            })
            .await
            .unwrap();

        assert!(matches!(
            svc.authenticate("ghost", "Str0ng!Pass").await,
            Err(AccountError::Inactive)
        ));
    }

    #[tokio::test]
    async fn test_token_for_unknown_user_is_stale() {
        let svc = service();
        let ghost = AuthContext {
            user_id: uuid::Uuid::new_v4(),
            username: "ghost".to_string(),
        };
        let token = jwt::create_token(&Claims::new(&ghost, TokenType::Access), SECRET).unwrap();

        assert!(matches!(
            svc.resolve_session(&token).await,
            Err(AccountError::StaleSession)
        ));
    }
}
