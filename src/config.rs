use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable overriding `server.secret_key`.
pub const SECRET_KEY_ENV: &str = "SECRET_KEY";

/// Environment variable overriding `general.database_path`.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub uploads: UploadConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:instance/site.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    /// Externally visible base URL used when printing magic links,
    /// e.g. `https://story.example.org`. Falls back to the request's Host header.
    pub public_url: Option<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    /// Sessions expire after this many days without a request.
    pub session_inactivity_days: i64,

    /// Key used to sign session cookies. Must be at least 64 bytes.
    /// When unset a random key is generated on every start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            public_url: None,
            secure_cookies: true,
            session_inactivity_days: 30,
            secret_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory uploaded images are written to
    pub upload_dir: String,

    /// URL prefix under which `upload_dir` is served
    pub public_prefix: String,

    /// Maximum request body size for the dashboard form (default: 16 MiB)
    pub max_upload_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_dir: "static/uploads".to_string(),
            public_prefix: "/static/uploads".to_string(),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Record request counters and expose them at `/admin/metrics`
    pub metrics_enabled: bool,
}

impl Config {
    /// Loads the first config file found and applies environment overrides.
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Applies `SECRET_KEY` and `DATABASE_URL`. Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(SECRET_KEY_ENV).filter(|v| !v.is_empty()) {
            self.server.secret_key = Some(key);
        }

        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.general.database_path = url;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("storypage").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".storypage").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("server.port must be > 0");
        }

        if self.server.session_inactivity_days <= 0 {
            anyhow::bail!("server.session_inactivity_days must be > 0");
        }

        if let Some(key) = &self.server.secret_key
            && key.len() < 64
        {
            anyhow::bail!("Secret key must be at least 64 bytes long");
        }

        if self.uploads.max_upload_bytes == 0 {
            anyhow::bail!("uploads.max_upload_bytes must be > 0");
        }

        if !self.uploads.public_prefix.starts_with('/') {
            anyhow::bail!("uploads.public_prefix must start with '/'");
        }

        if self.uploads.public_prefix.trim_end_matches('/').is_empty() {
            anyhow::bail!("uploads.public_prefix must not be the site root");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.uploads.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(config.uploads.public_prefix, "/static/uploads");
        assert!(config.server.secure_cookies);
        assert!(config.server.secret_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [uploads]
            upload_dir = "/srv/uploads"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.uploads.upload_dir, "/srv/uploads");
        assert_eq!(config.uploads.public_prefix, "/static/uploads");
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides(|name| match name {
            SECRET_KEY_ENV => Some("k".repeat(64)),
            DATABASE_URL_ENV => Some("sqlite:/tmp/other.db".to_string()),
            _ => None,
        });

        assert_eq!(config.server.secret_key.as_deref(), Some("k".repeat(64).as_str()));
        assert_eq!(config.general.database_path, "sqlite:/tmp/other.db");
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env_overrides(|_| Some(String::new()));
        assert!(config.server.secret_key.is_none());
        assert_eq!(config.general.database_path, "sqlite:instance/site.db");
    }

    #[test]
    fn test_short_secret_key_rejected() {
        let mut config = Config::default();
        config.server.secret_key = Some("too-short".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_relative_public_prefix_rejected() {
        let mut config = Config::default();
        config.uploads.public_prefix = "uploads".to_string();
        assert!(config.validate().is_err());
    }
}
