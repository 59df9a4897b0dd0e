//! One-shot messages carried across a redirect in the session.

use tower_sessions::Session;

use super::ApiError;
use crate::constants::session::FLASH_KEY;

pub async fn push(session: &Session, message: impl Into<String>) -> Result<(), ApiError> {
    let mut messages: Vec<String> = session.get(FLASH_KEY).await?.unwrap_or_default();
    messages.push(message.into());
    session.insert(FLASH_KEY, messages).await?;
    Ok(())
}

/// Returns and clears the pending messages.
pub async fn take(session: &Session) -> Result<Vec<String>, ApiError> {
    Ok(session
        .remove::<Vec<String>>(FLASH_KEY)
        .await?
        .unwrap_or_default())
}
