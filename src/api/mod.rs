use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing::warn;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::Config;
use crate::db::Store;
use crate::models::Role;
use crate::services::{
    AuthService, ConfigService, SeaOrmAuthService, SeaOrmConfigService, UploadService,
};

mod admin;
mod assets;
pub mod auth;
mod error;
mod flash;
mod observability;
mod story;
mod types;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth: Arc<dyn AuthService>,

    pub site_config: Arc<dyn ConfigService>,

    pub uploads: Arc<UploadService>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    /// Base URL printed in front of `/magic/<token>`.
    ///
    /// Uses `server.public_url` when configured, otherwise the request's Host.
    #[must_use]
    pub fn base_url(&self, host: Option<&str>) -> String {
        if let Some(url) = &self.config.server.public_url {
            return url.trim_end_matches('/').to_string();
        }

        let scheme = if self.config.server.secure_cookies {
            "https"
        } else {
            "http"
        };
        let host = host.map_or_else(
            || format!("localhost:{}", self.config.server.port),
            str::to_string,
        );
        format!("{scheme}://{host}")
    }
}

/// Opens the database, seeds default content and makes sure an admin exists.
pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let auth = Arc::new(SeaOrmAuthService::new(
        store.clone(),
        config.security.clone(),
    ));
    let site_config = Arc::new(SeaOrmConfigService::new(
        store.clone(),
        config.uploads.public_prefix.trim_end_matches('/').to_string(),
    ));
    let uploads = Arc::new(UploadService::new(&config.uploads));

    uploads.ensure_dir().await?;
    site_config.seed_defaults().await?;
    auth.ensure_bootstrap_admin().await?;

    Ok(Arc::new(AppState {
        config: Arc::new(config),
        store,
        auth,
        site_config,
        uploads,
        prometheus_handle,
    }))
}

pub async fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let config = state.config.clone();

    let session_store = SqliteStore::new(state.store.conn.get_sqlite_connection_pool().clone());
    session_store.migrate().await?;

    let key = match &config.server.secret_key {
        Some(secret) => Key::try_from(secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("Invalid secret key: {e}"))?,
        None => {
            warn!("No secret key configured; sessions will not survive a restart");
            Key::generate()
        }
    };

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.server.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(
            config.server.session_inactivity_days,
        )))
        .with_signed(key);

    let app = Router::new()
        .merge(create_admin_router(config.uploads.max_upload_bytes))
        .merge(create_viewer_router())
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/magic/{token}", get(auth::magic_login))
        .layer(session_layer)
        .with_state(state);

    let public_prefix = config.uploads.public_prefix.trim_end_matches('/');

    Ok(app
        .nest_service(public_prefix, ServeDir::new(&config.uploads.upload_dir))
        .route("/assets/{*path}", get(assets::serve_asset))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        )))
}

fn create_viewer_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(story::index))
        .route("/logout", get(auth::logout))
        .route_layer(middleware::from_fn(auth::require_login))
}

fn create_admin_router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin", get(admin::dashboard).post(admin::save_dashboard))
        .route("/admin/api/update", post(admin::api_update_config))
        .route("/admin/users/create", post(admin::create_user))
        .route("/admin/users/link/{user_id}", get(admin::regenerate_link))
        .route("/admin/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(
            Role::Admin,
            auth::require_role,
        ))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
