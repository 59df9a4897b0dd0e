//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::constants::{bootstrap, limits};
use crate::db::Store;
use crate::db::repositories::user::{NewUser, generate_token, hash_password_blocking};
use crate::models::{Role, SessionUser};
use crate::services::auth_service::{AuthError, AuthService, UserInfo};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<SessionUser, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .user_repo()
            .verify_password(username, password, &self.security)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if user.must_change_password {
            warn!(
                username = %user.username,
                "Logged in with the placeholder password, change it with `storypage passwd`"
            );
        }

        Ok(SessionUser::from(&user))
    }

    async fn login_via_token(&self, token: &str) -> Result<SessionUser, AuthError> {
        let user = self
            .store
            .user_repo()
            .get_by_magic_token(token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        Ok(SessionUser::from(&user))
    }

    async fn create_user(&self, username: &str) -> Result<UserInfo, AuthError> {
        let username = username.trim();

        if username.is_empty() {
            return Err(AuthError::Validation("Username is required".to_string()));
        }
        if username.chars().count() > limits::MAX_USERNAME_LENGTH {
            return Err(AuthError::Validation(format!(
                "Username must be {} characters or less",
                limits::MAX_USERNAME_LENGTH
            )));
        }

        let repo = self.store.user_repo();
        if repo.get_by_username(username).await?.is_some() {
            return Err(AuthError::UserExists(username.to_string()));
        }

        // Link-only account: the password is never shown to anyone.
        let password_hash = hash_password_blocking(&generate_token(), &self.security).await?;

        let user = repo
            .create(NewUser {
                username,
                password_hash,
                role: Role::Viewer,
                magic_token: Some(generate_token()),
                must_change_password: false,
            })
            .await?;

        info!(username = %user.username, id = user.id, "Created viewer account");
        Ok(UserInfo::from(user))
    }

    async fn regenerate_magic_token(&self, user_id: i32) -> Result<String, AuthError> {
        let token = self
            .store
            .user_repo()
            .regenerate_magic_token(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        info!(user_id, "Magic link regenerated");
        Ok(token)
    }

    async fn get_user(&self, username: &str) -> Result<UserInfo, AuthError> {
        self.store
            .user_repo()
            .get_by_username(username)
            .await?
            .map(UserInfo::from)
            .ok_or(AuthError::UserNotFound)
    }

    async fn list_users(&self) -> Result<Vec<UserInfo>, AuthError> {
        let users = self.store.user_repo().list().await?;
        Ok(users.into_iter().map(UserInfo::from).collect())
    }

    async fn ensure_bootstrap_admin(&self) -> Result<bool, AuthError> {
        let repo = self.store.user_repo();

        if repo.count_with_role(Role::Admin).await? > 0 {
            if let Some(admin) = repo.get_by_username(bootstrap::ADMIN_USERNAME).await?
                && admin.must_change_password
            {
                warn!(
                    "The '{}' account still uses the default password. Run `storypage passwd {}`",
                    bootstrap::ADMIN_USERNAME,
                    bootstrap::ADMIN_USERNAME
                );
            }
            return Ok(false);
        }

        if repo
            .get_by_username(bootstrap::ADMIN_USERNAME)
            .await?
            .is_some()
        {
            return Err(AuthError::Internal(format!(
                "No admin exists but the username '{}' is taken by a viewer",
                bootstrap::ADMIN_USERNAME
            )));
        }

        let password_hash =
            hash_password_blocking(bootstrap::ADMIN_PASSWORD, &self.security).await?;

        repo.create(NewUser {
            username: bootstrap::ADMIN_USERNAME,
            password_hash,
            role: Role::Admin,
            magic_token: None,
            must_change_password: true,
        })
        .await?;

        warn!(
            "Created default admin user '{}' with the placeholder password. Change it with `storypage passwd {}`",
            bootstrap::ADMIN_USERNAME,
            bootstrap::ADMIN_USERNAME
        );
        Ok(true)
    }

    async fn change_password(&self, username: &str, new_password: &str) -> Result<(), AuthError> {
        if new_password.chars().count() < limits::MIN_PASSWORD_LENGTH {
            return Err(AuthError::Validation(format!(
                "New password must be at least {} characters",
                limits::MIN_PASSWORD_LENGTH
            )));
        }

        let repo = self.store.user_repo();
        let user = repo
            .get_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let password_hash = hash_password_blocking(new_password, &self.security).await?;
        repo.update_password_hash(user.id, password_hash).await?;

        info!("Password changed for user: {username}");
        Ok(())
    }
}
