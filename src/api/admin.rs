use axum::{
    Extension, Form, Json,
    body::Bytes,
    extract::{Multipart, Path, State, rejection::JsonRejection},
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Redirect},
};
use std::sync::Arc;
use tower_sessions::Session;
use tracing::{info, warn};

use super::{ApiError, ApiResponse, AppState, CreateUserForm, UpdateConfigRequest, flash};
use crate::models::SessionUser;
use crate::services::config_service::{key_from_config_field, key_from_file_field};
use crate::services::{AuthError, ConfigError, ImageAssignment};
use crate::views::{AdminPage, render_admin};

struct PendingUpload {
    field: String,
    filename: String,
    bytes: Bytes,
}

/// Text fields and files of one dashboard submission.
#[derive(Default)]
struct DashboardForm {
    fields: Vec<(String, String)>,
    files: Vec<PendingUpload>,
}

async fn read_dashboard_form(mut multipart: Multipart) -> Result<DashboardForm, ApiError> {
    let mut form = DashboardForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if let Some(filename) = field.file_name().map(str::to_string) {
            let bytes = field.bytes().await?;
            // An untouched file input arrives with an empty filename.
            if filename.is_empty() || bytes.is_empty() {
                continue;
            }
            form.files.push(PendingUpload {
                field: name,
                filename,
                bytes,
            });
        } else if let Some(key) = key_from_config_field(&name).map(str::to_string) {
            let value = field.text().await?;
            form.fields.push((key, value));
        }
    }

    Ok(form)
}

fn invalid_fields_message(keys: &[String]) -> String {
    format!("Ungültige Werte für: {}", keys.join(", "))
}

/// GET /admin
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    session: Session,
    headers: HeaderMap,
) -> Result<Html<String>, ApiError> {
    let entries = state.site_config.entries().await?;
    let users = state.auth.list_users().await?;
    let messages = flash::take(&session).await?;

    let host = headers.get(header::HOST).and_then(|h| h.to_str().ok());
    let base_url = state.base_url(host);

    Ok(Html(render_admin(&AdminPage {
        entries: &entries,
        users: &users,
        messages: &messages,
        base_url: &base_url,
        current_user: &user.username,
    })))
}

/// POST /admin
///
/// Validates every text field first, then writes uploads to disk, then
/// applies text fields and image paths in one transaction.
pub async fn save_dashboard(
    State(state): State<Arc<AppState>>,
    session: Session,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let form = read_dashboard_form(multipart).await?;

    match state.site_config.validate_fields(&form.fields).await {
        Ok(()) => {}
        Err(ConfigError::InvalidFields(keys)) => {
            flash::push(&session, invalid_fields_message(&keys)).await?;
            return Ok(Redirect::to("/admin"));
        }
        Err(e) => return Err(e.into()),
    }

    let mut images = Vec::with_capacity(form.files.len());
    for upload in &form.files {
        let Some(key) = key_from_file_field(&upload.field) else {
            warn!(field = %upload.field, "Ignoring upload with invalid field name");
            continue;
        };

        let stored = state
            .uploads
            .store(&upload.field, &upload.filename, &upload.bytes)
            .await?;

        images.push(ImageAssignment {
            key: key.to_string(),
            public_path: stored.public_path,
        });
    }

    match state.site_config.bulk_update(&form.fields, &images).await {
        Ok(outcome) => {
            if !outcome.ignored.is_empty() {
                info!(ignored = ?outcome.ignored, "Unknown dashboard fields ignored");
            }
            flash::push(&session, "Einstellungen gespeichert!").await?;
        }
        Err(ConfigError::InvalidFields(keys)) => {
            flash::push(&session, invalid_fields_message(&keys)).await?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Redirect::to("/admin"))
}

/// POST /admin/api/update
pub async fn api_update_config(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UpdateConfigRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, ApiError> {
    let Json(payload) = payload?;
    let key = payload.key.as_deref().map(str::trim).unwrap_or_default();
    let value = payload.value_text();

    state.site_config.update_single(key, &value).await?;

    Ok(Json(ApiResponse::ok()))
}

/// POST /admin/users/create
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<CreateUserForm>,
) -> Result<Redirect, ApiError> {
    match state.auth.create_user(&form.username).await {
        Ok(user) => {
            flash::push(&session, format!("Benutzer {} erstellt!", user.username)).await?;
        }
        Err(err @ AuthError::UserExists(_)) => {
            flash::push(&session, err.to_string()).await?;
        }
        Err(AuthError::Validation(msg)) => {
            flash::push(&session, msg).await?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Redirect::to("/admin"))
}

/// GET /admin/users/link/{user_id}
pub async fn regenerate_link(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(user_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    match state.auth.regenerate_magic_token(user_id).await {
        Ok(_) => {
            flash::push(&session, "Neuer Link erstellt!").await?;
            Ok(Redirect::to("/admin"))
        }
        Err(AuthError::UserNotFound) => Err(ApiError::not_found("User", user_id)),
        Err(e) => Err(e.into()),
    }
}
