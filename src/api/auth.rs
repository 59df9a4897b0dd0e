use axum::{
    Extension, Form,
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_sessions::Session;
use tracing::{info, warn};

use super::{ApiError, AppState, LoginForm, flash};
use crate::constants::session::USER_KEY;
use crate::models::{Role, SessionUser};
use crate::services::{AuthError, require_role as check_role};
use crate::views::render_login;

// ============================================================================
// Session helpers
// ============================================================================

/// The identity stored by a successful login, if any.
pub async fn current_user(session: &Session) -> Result<Option<SessionUser>, ApiError> {
    Ok(session.get::<SessionUser>(USER_KEY).await?)
}

async fn establish_session(session: &Session, user: &SessionUser) -> Result<(), ApiError> {
    // New id on privilege change so a pre-login cookie cannot be reused.
    session.cycle_id().await?;
    session.insert(USER_KEY, user).await?;
    Ok(())
}

// ============================================================================
// Middleware
// ============================================================================

/// Requires a logged-in user of any role. Anonymous requests are sent to
/// the login page.
pub async fn require_login(session: Session, mut request: Request, next: Next) -> Response {
    match current_user(&session).await {
        Ok(Some(user)) => {
            tracing::Span::current().record("user_id", user.id);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(None) => Redirect::to("/login").into_response(),
        Err(e) => e.into_response(),
    }
}

/// Requires a logged-in user holding `required`. Anonymous and
/// under-privileged callers get the same 403.
pub async fn require_role(
    State(required): State<Role>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let user = match current_user(&session).await {
        Ok(Some(user)) => user,
        Ok(None) => return forbidden(),
        Err(e) => return e.into_response(),
    };

    if check_role(&user, required).is_err() {
        warn!(user_id = user.id, required = %required, "Role check failed");
        return forbidden();
    }

    tracing::Span::current().record("user_id", user.id);
    request.extensions_mut().insert(user);
    next.run(request).await
}

fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, "Forbidden").into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /login
pub async fn login_page(session: Session) -> Result<Response, ApiError> {
    if current_user(&session).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let messages = flash::take(&session).await?;
    Ok(Html(render_login(&messages, "")).into_response())
}

/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let username = form.username.trim();

    match state.auth.login(username, &form.password).await {
        Ok(user) => {
            establish_session(&session, &user).await?;
            info!(user_id = user.id, role = %user.role, "Password login");
            Ok(Redirect::to("/").into_response())
        }
        Err(err @ AuthError::InvalidCredentials) => {
            warn!(username, "Failed login attempt");
            let messages = vec![err.to_string()];
            Ok(Html(render_login(&messages, username)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /magic/{token}
pub async fn magic_login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(token): Path<String>,
) -> Result<Response, ApiError> {
    match state.auth.login_via_token(&token).await {
        Ok(user) => {
            establish_session(&session, &user).await?;
            info!(user_id = user.id, "Magic link login");
            Ok(Redirect::to("/").into_response())
        }
        Err(err @ AuthError::InvalidToken) => {
            warn!("Rejected magic link");
            Ok((StatusCode::UNAUTHORIZED, err.to_string()).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /logout
pub async fn logout(Extension(user): Extension<SessionUser>, session: Session) -> impl IntoResponse {
    if let Err(e) = session.flush().await {
        warn!("Failed to flush session: {e}");
    }
    info!(user_id = user.id, "Logged out");
    Redirect::to("/login")
}
