//! Typed values for the site configuration table.
//!
//! The table stores free text, but every entry carries a [`ConfigKind`] that
//! is checked whenever the dashboard writes a value.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigKind {
    Text,
    Number,
    Image,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValueError {
    #[error("'{value}' is not a number")]
    InvalidNumber { value: String },

    #[error("'{value}' is neither an http(s) URL nor an uploaded file")]
    InvalidImage { value: String },
}

/// A config value that passed validation for its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Text(String),
    Number(String),
    Image(String),
}

/// A row of the config table as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub kind: ConfigKind,
}

impl ConfigKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Image => "image",
        }
    }

    /// Unknown tags are treated as free text.
    #[must_use]
    pub fn from_db(value: &str) -> Self {
        match value {
            "number" => Self::Number,
            "image" => Self::Image,
            _ => Self::Text,
        }
    }

    /// Checks `raw` against this kind. `upload_prefix` is the public URL
    /// prefix of uploaded files, which are valid image values.
    pub fn validate(self, raw: &str, upload_prefix: &str) -> Result<ConfigValue, ConfigValueError> {
        match self {
            Self::Text => Ok(ConfigValue::Text(raw.to_string())),
            Self::Number => {
                let trimmed = raw.trim();
                if trimmed.parse::<i64>().is_ok() || trimmed.parse::<f64>().is_ok_and(f64::is_finite)
                {
                    Ok(ConfigValue::Number(trimmed.to_string()))
                } else {
                    Err(ConfigValueError::InvalidNumber {
                        value: raw.to_string(),
                    })
                }
            }
            Self::Image => {
                let trimmed = raw.trim();
                if trimmed.is_empty()
                    || is_http_url(trimmed)
                    || is_upload_path(trimmed, upload_prefix)
                {
                    Ok(ConfigValue::Image(trimmed.to_string()))
                } else {
                    Err(ConfigValueError::InvalidImage {
                        value: raw.to_string(),
                    })
                }
            }
        }
    }
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigValue {
    #[must_use]
    pub const fn kind(&self) -> ConfigKind {
        match self {
            Self::Text(_) => ConfigKind::Text,
            Self::Number(_) => ConfigKind::Number,
            Self::Image(_) => ConfigKind::Image,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(v) | Self::Number(v) | Self::Image(v) => v,
        }
    }
}

fn is_http_url(value: &str) -> bool {
    url::Url::parse(value).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

fn is_upload_path(value: &str, upload_prefix: &str) -> bool {
    let prefix = upload_prefix.trim_end_matches('/');
    value
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|name| !name.is_empty() && !name.contains("..") && !name.contains('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "/static/uploads";

    #[test]
    fn test_text_accepts_anything() {
        let value = ConfigKind::Text.validate("  <b>hi</b>\n", PREFIX).unwrap();
        assert_eq!(value, ConfigValue::Text("  <b>hi</b>\n".to_string()));
    }

    #[test]
    fn test_number_validation() {
        assert_eq!(
            ConfigKind::Number.validate(" 6 ", PREFIX).unwrap(),
            ConfigValue::Number("6".to_string())
        );
        assert!(ConfigKind::Number.validate("2.5", PREFIX).is_ok());
        assert!(ConfigKind::Number.validate("-3", PREFIX).is_ok());
        assert!(ConfigKind::Number.validate("six", PREFIX).is_err());
        assert!(ConfigKind::Number.validate("", PREFIX).is_err());
        assert!(ConfigKind::Number.validate("NaN", PREFIX).is_err());
        assert!(ConfigKind::Number.validate("inf", PREFIX).is_err());
    }

    #[test]
    fn test_image_validation() {
        assert!(
            ConfigKind::Image
                .validate("https://images.unsplash.com/photo.jpg?w=800", PREFIX)
                .is_ok()
        );
        assert!(ConfigKind::Image.validate("http://example.org/a.png", PREFIX).is_ok());
        assert!(
            ConfigKind::Image
                .validate("/static/uploads/file_img_now_ab12cd34_me.jpg", PREFIX)
                .is_ok()
        );
        assert!(ConfigKind::Image.validate("", PREFIX).is_ok());

        assert!(ConfigKind::Image.validate("javascript:alert(1)", PREFIX).is_err());
        assert!(ConfigKind::Image.validate("ftp://example.org/a.png", PREFIX).is_err());
        assert!(ConfigKind::Image.validate("/etc/passwd", PREFIX).is_err());
        assert!(ConfigKind::Image.validate("/static/uploads/", PREFIX).is_err());
        assert!(
            ConfigKind::Image
                .validate("/static/uploads/../secret", PREFIX)
                .is_err()
        );
    }

    #[test]
    fn test_kind_tags() {
        for kind in [ConfigKind::Text, ConfigKind::Number, ConfigKind::Image] {
            assert_eq!(ConfigKind::from_db(kind.as_str()), kind);
        }
        assert_eq!(ConfigKind::from_db("boolean"), ConfigKind::Text);
    }

    #[test]
    fn test_value_reports_its_kind() {
        let value = ConfigKind::Image.validate("https://a.example/x.jpg", PREFIX).unwrap();
        assert_eq!(value.kind(), ConfigKind::Image);
        assert_eq!(value.as_str(), "https://a.example/x.jpg");
    }
}
