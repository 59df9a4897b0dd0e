//! Domain service for the key-value page configuration.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::constants::{form, limits};
use crate::models::{ConfigEntry, ConfigValueError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Key missing")]
    KeyMissing,

    #[error("Config not found")]
    NotFound(String),

    #[error("Invalid value for '{key}': {source}")]
    InvalidValue {
        key: String,
        #[source]
        source: ConfigValueError,
    },

    #[error("Invalid values for: {}", .0.join(", "))]
    InvalidFields(Vec<String>),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ConfigError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ConfigError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// An image that has already been written to the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAssignment {
    pub key: String,
    pub public_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkUpdateOutcome {
    pub updated: usize,
    /// `config_*` fields whose key does not exist. They are ignored.
    pub ignored: Vec<String>,
    pub images: usize,
}

/// Maps a dashboard form field name to the config key it edits.
#[must_use]
pub fn key_from_config_field(field: &str) -> Option<&str> {
    field
        .strip_prefix(form::CONFIG_FIELD_PREFIX)
        .filter(|key| is_valid_key(key))
}

/// Maps an upload field name to its config key (`file_img_now` -> `img_now`).
/// Fields without the `file_` prefix use their name as the key.
#[must_use]
pub fn key_from_file_field(field: &str) -> Option<&str> {
    let key = field.strip_prefix(form::FILE_FIELD_PREFIX).unwrap_or(field);
    is_valid_key(key).then_some(key)
}

#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_\-]*$").expect("Invalid regex pattern defined in code")
    });

    key.len() <= limits::MAX_CONFIG_KEY_LENGTH && re.is_match(key)
}

/// Domain service trait for the site configuration.
#[async_trait::async_trait]
pub trait ConfigService: Send + Sync {
    /// Full key -> value snapshot for rendering.
    async fn snapshot(&self) -> Result<BTreeMap<String, String>, ConfigError>;

    /// All entries with their kind, ordered by key.
    async fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError>;

    async fn get(&self, key: &str) -> Result<Option<ConfigEntry>, ConfigError>;

    /// Updates one existing key. Never creates a key.
    ///
    /// # Errors
    ///
    /// [`ConfigError::KeyMissing`] for an empty key, [`ConfigError::NotFound`]
    /// for an unknown key, [`ConfigError::InvalidValue`] if the value does not
    /// fit the entry's kind.
    async fn update_single(&self, key: &str, value: &str) -> Result<(), ConfigError>;

    /// Checks `(key, value)` pairs against the kinds of existing entries.
    /// Unknown keys pass; they are ignored by [`ConfigService::bulk_update`].
    async fn validate_fields(&self, fields: &[(String, String)]) -> Result<(), ConfigError>;

    /// Applies a dashboard submission in one transaction: updates existing
    /// keys from `fields` and upserts `images` as image entries.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidFields`] if any field fails validation; nothing
    /// is written in that case.
    async fn bulk_update(
        &self,
        fields: &[(String, String)],
        images: &[ImageAssignment],
    ) -> Result<BulkUpdateOutcome, ConfigError>;

    /// Inserts missing default entries. Returns how many were inserted.
    async fn seed_defaults(&self) -> Result<usize, ConfigError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_config_field() {
        assert_eq!(key_from_config_field("config_years_count"), Some("years_count"));
        assert_eq!(key_from_config_field("years_count"), None);
        assert_eq!(key_from_config_field("config_"), None);
        assert_eq!(key_from_config_field("config_bad key"), None);
    }

    #[test]
    fn test_key_from_file_field() {
        assert_eq!(key_from_file_field("file_img_now"), Some("img_now"));
        assert_eq!(key_from_file_field("song_cover"), Some("song_cover"));
        assert_eq!(key_from_file_field("file_"), None);
        assert_eq!(key_from_file_field("file_../x"), None);
    }

    #[test]
    fn test_key_length_limit() {
        assert!(is_valid_key(&"a".repeat(limits::MAX_CONFIG_KEY_LENGTH)));
        assert!(!is_valid_key(&"a".repeat(limits::MAX_CONFIG_KEY_LENGTH + 1)));
    }
}
