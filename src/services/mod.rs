pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, UserInfo, require_role};
pub use auth_service_impl::SeaOrmAuthService;

pub mod config_service;
pub mod config_service_impl;
pub use config_service::{BulkUpdateOutcome, ConfigError, ConfigService, ImageAssignment};
pub use config_service_impl::SeaOrmConfigService;

pub mod upload;
pub use upload::{StoredUpload, UploadError, UploadService};
