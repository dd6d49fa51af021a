use serde::{Deserialize, Serialize};

use crate::{
    errors::{SchedError, SchedResult},
    models::auth::UserResponse,
};

/// An authenticated operator, resolved from a session before any service call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
}

/// Rejects calls made without a resolved principal.
pub fn require(principal: Option<&Principal>) -> SchedResult<&Principal> {
    principal.ok_or(SchedError::Unauthenticated)
}

impl From<&Principal> for UserResponse {
    fn from(principal: &Principal) -> Self {
        UserResponse {
            id: principal.user_id,
            username: principal.username.clone(),
        }
    }
}
