use axum::{Extension, extract::State, response::Html};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::models::SessionUser;
use crate::views::render_story;

/// GET /
pub async fn index(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> Result<Html<String>, ApiError> {
    let config = state.site_config.snapshot().await?;
    Ok(Html(render_story(&config, user.is_admin())))
}
