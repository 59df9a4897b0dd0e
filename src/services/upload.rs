use std::path::PathBuf;

use thiserror::Error;
use tokio::fs;
use tracing::info;

use crate::config::UploadConfig;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Uploaded file is empty")]
    Empty,

    #[error("Uploaded file is too large ({size} bytes, max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// A file that was written to the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub filename: String,
    pub public_path: String,
}

/// Writes dashboard uploads below the configured directory.
pub struct UploadService {
    upload_dir: PathBuf,
    public_prefix: String,
    max_bytes: usize,
}

impl UploadService {
    #[must_use]
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            upload_dir: PathBuf::from(&config.upload_dir),
            public_prefix: config.public_prefix.trim_end_matches('/').to_string(),
            max_bytes: config.max_upload_bytes,
        }
    }

    pub async fn ensure_dir(&self) -> Result<(), UploadError> {
        fs::create_dir_all(&self.upload_dir).await?;
        Ok(())
    }

    /// Stores `bytes` as `<field>_<8 hex>_<original name>` (sanitized).
    ///
    /// The file is written under a temporary name and renamed into place, so
    /// the returned path only ever refers to a complete file.
    pub async fn store(
        &self,
        field_name: &str,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<StoredUpload, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                size: bytes.len(),
                max: self.max_bytes,
            });
        }

        let filename = sanitize_filename(&format!(
            "{field_name}_{}_{original_filename}",
            random_suffix()
        ));

        self.ensure_dir().await?;
        let final_path = self.upload_dir.join(&filename);
        let partial_path = self.upload_dir.join(format!(".{filename}.part"));

        fs::write(&partial_path, bytes).await?;
        if let Err(e) = fs::rename(&partial_path, &final_path).await {
            let _ = fs::remove_file(&partial_path).await;
            return Err(e.into());
        }

        info!(
            path = %final_path.display(),
            size = bytes.len(),
            "Stored upload"
        );

        Ok(StoredUpload {
            public_path: format!("{}/{}", self.public_prefix, filename),
            filename,
        })
    }
}

/// 4 random bytes as 8 hex characters.
fn random_suffix() -> String {
    use rand::Rng;

    let value: u32 = rand::rng().random();
    format!("{value:08x}")
}

/// Reduces a client-supplied filename to `[A-Za-z0-9._-]`.
///
/// Path separators and whitespace become underscores, other characters are
/// dropped, and leading/trailing dots and underscores are stripped so the
/// result can never be hidden or escape the upload directory.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = replaced.split_whitespace().collect::<Vec<_>>().join("_");

    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let trimmed = filtered.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("My cool pic.jpg"), "My_cool_pic.jpg");
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(sanitize_filename("ümlaut €.png"), "mlaut_.png");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename("///"), "upload");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[test]
    fn test_random_suffix_format() {
        let suffix = random_suffix();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_store_writes_file_and_returns_public_path() {
        let dir = std::env::temp_dir().join(format!("storypage-upload-{}", uuid::Uuid::new_v4()));
        let service = UploadService::new(&UploadConfig {
            upload_dir: dir.display().to_string(),
            public_prefix: "/static/uploads/".to_string(),
            max_upload_bytes: 1024,
        });

        let stored = service
            .store("file_img_now", "me and you.jpg", b"jpegdata")
            .await
            .unwrap();

        assert!(stored.filename.starts_with("file_img_now_"));
        assert!(stored.filename.ends_with("_me_and_you.jpg"));
        assert_eq!(stored.public_path, format!("/static/uploads/{}", stored.filename));
        assert_eq!(std::fs::read(dir.join(&stored.filename)).unwrap(), b"jpegdata");

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_store_rejects_empty_and_oversized() {
        let dir = std::env::temp_dir().join(format!("storypage-upload-{}", uuid::Uuid::new_v4()));
        let service = UploadService::new(&UploadConfig {
            upload_dir: dir.display().to_string(),
            public_prefix: "/static/uploads".to_string(),
            max_upload_bytes: 4,
        });

        assert!(matches!(
            service.store("file_x", "a.jpg", b"").await,
            Err(UploadError::Empty)
        ));
        assert!(matches!(
            service.store("file_x", "a.jpg", b"12345").await,
            Err(UploadError::TooLarge { size: 5, max: 4 })
        ));

        let _ = std::fs::remove_dir_all(dir);
    }
}
