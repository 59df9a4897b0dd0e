//! Domain service for authentication and user management.
//!
//! Handles password login, magic-link redemption, role checks and the
//! lifecycle of link-only viewer accounts.

use serde::Serialize;
use thiserror::Error;

use crate::db::User;
use crate::db::repositories::user::CreateUserError;
use crate::models::{Role, SessionUser};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username and wrong password are deliberately the same error.
    #[error("Login fehlgeschlagen. Bitte überprüfe deine Daten.")]
    InvalidCredentials,

    #[error("Ungültiger oder abgelaufener Link")]
    InvalidToken,

    #[error("Forbidden")]
    Forbidden,

    #[error("User not found")]
    UserNotFound,

    #[error("Benutzer existiert bereits!")]
    UserExists(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<CreateUserError> for AuthError {
    fn from(err: CreateUserError) -> Self {
        match err {
            CreateUserError::UsernameTaken(username) => Self::UserExists(username),
            CreateUserError::Database(err) => Self::from(err),
        }
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// User info DTO for the dashboard and the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub magic_token: Option<String>,
    pub must_change_password: bool,
    pub created_at: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            magic_token: user.magic_token,
            must_change_password: user.must_change_password,
            created_at: user.created_at,
        }
    }
}

/// Fails with [`AuthError::Forbidden`] unless `user` holds `required`.
pub fn require_role(user: &SessionUser, required: Role) -> Result<(), AuthError> {
    if user.role == required {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and returns the identity to store in the session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown user and for
    /// a wrong password alike.
    async fn login(&self, username: &str, password: &str) -> Result<SessionUser, AuthError>;

    /// Resolves a magic-link token. Tokens never expire and can be redeemed
    /// any number of times until they are regenerated.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if no user holds `token`.
    async fn login_via_token(&self, token: &str) -> Result<SessionUser, AuthError>;

    /// Creates a viewer with a random password and an immediate magic token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserExists`] if the username is taken.
    async fn create_user(&self, username: &str) -> Result<UserInfo, AuthError>;

    /// Replaces a user's magic token, invalidating the previous link.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserNotFound`] for an unknown id.
    async fn regenerate_magic_token(&self, user_id: i32) -> Result<String, AuthError>;

    async fn get_user(&self, username: &str) -> Result<UserInfo, AuthError>;

    async fn list_users(&self) -> Result<Vec<UserInfo>, AuthError>;

    /// Creates the placeholder admin account when no admin exists.
    /// Returns `true` if an account was created.
    async fn ensure_bootstrap_admin(&self) -> Result<bool, AuthError>;

    /// Sets a new password and clears the forced-change flag.
    async fn change_password(&self, username: &str, new_password: &str) -> Result<(), AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_user(role: Role) -> SessionUser {
        SessionUser {
            id: 1,
            username: "someone".to_string(),
            role,
        }
    }

    #[test]
    fn test_require_role() {
        assert!(require_role(&session_user(Role::Admin), Role::Admin).is_ok());
        assert!(require_role(&session_user(Role::Viewer), Role::Viewer).is_ok());
        assert!(matches!(
            require_role(&session_user(Role::Viewer), Role::Admin),
            Err(AuthError::Forbidden)
        ));
    }

    #[test]
    fn test_login_failure_message_is_generic() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Login fehlgeschlagen. Bitte überprüfe deine Daten."
        );
    }
}
