use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use std::sync::OnceLock;
use thiserror::Error;
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::{prelude::*, users};
use crate::models::{Role, SessionUser};

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub magic_token: Option<String>,
    pub must_change_password: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            role: Role::from_db(&model.role),
            username: model.username,
            magic_token: model.magic_token,
            must_change_password: model.must_change_password,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Error)]
pub enum CreateUserError {
    /// The `users.username` unique index rejected the insert.
    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("Failed to create user: {0}")]
    Database(#[from] DbErr),
}

/// Fields needed to insert a user.
pub struct NewUser<'u> {
    pub username: &'u str,
    pub password_hash: String,
    pub role: Role,
    pub magic_token: Option<String>,
    pub must_change_password: bool,
}

pub struct UserRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    /// Exact match on the stored magic token.
    pub async fn get_by_magic_token(&self, token: &str) -> Result<Option<User>> {
        if token.is_empty() {
            return Ok(None);
        }

        let user = Users::find()
            .filter(users::Column::MagicToken.eq(token))
            .one(self.conn)
            .await
            .context("Failed to query user by magic token")?;

        Ok(user.map(User::from))
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = Users::find()
            .order_by_asc(users::Column::Id)
            .all(self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn count_with_role(&self, role: Role) -> Result<u64> {
        Users::find()
            .filter(users::Column::Role.eq(role.as_str()))
            .count(self.conn)
            .await
            .context("Failed to count users by role")
    }

    /// Inserts a user. A duplicate username is reported as
    /// [`CreateUserError::UsernameTaken`] even when a concurrent insert won
    /// the race after the caller's own existence check.
    pub async fn create(&self, new_user: NewUser<'_>) -> Result<User, CreateUserError> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            username: Set(new_user.username.to_string()),
            password_hash: Set(new_user.password_hash),
            role: Set(new_user.role.as_str().to_string()),
            magic_token: Set(new_user.magic_token),
            must_change_password: Set(new_user.must_change_password),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        match active.insert(self.conn).await {
            Ok(model) => Ok(User::from(model)),
            Err(err) if is_username_conflict(&err) => {
                Err(CreateUserError::UsernameTaken(new_user.username.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Verify password for a user. Unknown users verify as `false`.
    ///
    /// Unknown users are checked against a dummy hash built with the same
    /// parameters, so both failures cost one Argon2 verification.
    /// Argon2 is CPU-intensive, so verification runs in `spawn_blocking`.
    pub async fn verify_password(
        &self,
        username: &str,
        password: &str,
        config: &SecurityConfig,
    ) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let password = password.to_string();
        let config = config.clone();

        let is_valid = task::spawn_blocking(move || {
            let password_hash = match stored_hash {
                Some(hash) => hash,
                None => dummy_hash(&config)?.to_string(),
            };
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            Ok::<bool, anyhow::Error>(
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(user.filter(|_| is_valid).map(User::from))
    }

    /// Replaces the password hash and clears `must_change_password`.
    pub async fn update_password_hash(&self, id: i32, password_hash: String) -> Result<()> {
        let user = Users::find_by_id(id)
            .one(self.conn)
            .await
            .context("Failed to query user for password update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(password_hash);
        active.must_change_password = Set(false);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(self.conn).await?;

        Ok(())
    }

    /// Stores a fresh magic token, replacing any previous one.
    /// Returns `None` when the user does not exist.
    pub async fn regenerate_magic_token(&self, id: i32) -> Result<Option<String>> {
        let Some(user) = Users::find_by_id(id)
            .one(self.conn)
            .await
            .context("Failed to query user for token regeneration")?
        else {
            return Ok(None);
        };

        let token = generate_token();

        let mut active: users::ActiveModel = user.into();
        active.magic_token = Set(Some(token.clone()));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(self.conn).await?;

        Ok(Some(token))
    }
}

/// Hash a password with Argon2id using the configured params.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

    let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

fn is_username_conflict(err: &DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(msg)) if msg.contains("username")
    )
}

/// Hash of a random password, verified against when the username is unknown.
/// Built once per process from the first configuration that asks for it.
fn dummy_hash(config: &SecurityConfig) -> Result<&'static str> {
    static HASH: OnceLock<String> = OnceLock::new();

    if let Some(hash) = HASH.get() {
        return Ok(hash);
    }
    let hash = hash_password(&generate_token(), config)?;
    Ok(HASH.get_or_init(|| hash))
}

/// Same as [`hash_password`] but off the async runtime.
pub async fn hash_password_blocking(password: &str, config: &SecurityConfig) -> Result<String> {
    let password = password.to_string();
    let config = config.clone();
    task::spawn_blocking(move || hash_password(&password, &config))
        .await
        .context("Password hashing task panicked")?
}

/// Generate a random token (32 random bytes as a 64 character hex string).
/// Used for magic links and for the throwaway passwords of link-only users.
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_format() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_token_is_random() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_dummy_hash_is_stable_and_parses() {
        let config = SecurityConfig::default();
        let first = dummy_hash(&config).unwrap();
        assert_eq!(first, dummy_hash(&config).unwrap());

        let parsed = PasswordHash::new(first).unwrap();
        assert!(Argon2::default().verify_password(b"", &parsed).is_err());
    }

    #[test]
    fn test_hash_password_verifies() {
        let config = SecurityConfig::default();
        let hash = hash_password("correct horse", &config).unwrap();
        assert!(hash.starts_with("$argon2id$"));

        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"correct horse", &parsed)
                .is_ok()
        );
        assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
    }
}
