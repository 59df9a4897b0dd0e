use serde::{Deserialize, Serialize};

use super::Role;

/// Identity stored in the session once a login succeeds.
///
/// The magic token is deliberately absent: regenerating a token must not
/// log out sessions that were established with the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

impl SessionUser {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
