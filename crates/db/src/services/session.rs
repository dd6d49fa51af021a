use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use unitsched_core::{
    errors::{SchedError, SchedResult},
    principal::Principal,
};
use uuid::Uuid;

use super::store_error;
use crate::{
    errors::classify,
    repositories::{session as session_repo, user as user_repo},
    schema::USER_USERNAME_UNIQUE,
    DbPool,
};

pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// A freshly opened session.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub principal: Principal,
    pub token: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionService {
    pool: DbPool,
    ttl: Duration,
}

impl SessionService {
    pub fn new(pool: DbPool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> SchedResult<DateTime<Utc>> {
        now.checked_add_signed(self.ttl)
            .ok_or_else(|| SchedError::Internal("Session lifetime overflows the clock".into()))
    }

    /// Verifies the credentials and opens a session for the user.
    pub async fn login(&self, username: &str, password: &str) -> SchedResult<LoginSession> {
        let username = username.trim();
        let invalid = || SchedError::Authentication(INVALID_CREDENTIALS.to_string());
        let expires_at = self.expiry_from(Utc::now())?;

        let user = user_repo::get_user_by_username(&self.pool, username)
            .await
            .map_err(store_error)?
            .ok_or_else(invalid)?;

        // argon2 verification is CPU-bound; keep it off the async workers.
        let password = password.to_string();
        let (user, is_valid) = tokio::task::spawn_blocking(move || {
            let is_valid = user_repo::verify_password(&user, &password);
            (user, is_valid)
        })
        .await
        .map_err(|e| SchedError::Internal(Box::new(e)))?;
        if !is_valid? {
            debug!("Rejected login for {}", username);
            return Err(invalid());
        }

        let session = session_repo::create_session(&self.pool, user.id, expires_at)
            .await
            .map_err(store_error)?;

        info!("User {} logged in", user.username);
        Ok(LoginSession {
            principal: user.into(),
            token: session.token,
            expires_at: session.expires_at,
        })
    }

    /// Resolves an unexpired session token to its principal.
    pub async fn resolve(&self, token: Uuid) -> SchedResult<Option<Principal>> {
        let user = session_repo::get_session_user(&self.pool, token)
            .await
            .map_err(store_error)?;
        Ok(user.map(Principal::from))
    }

    pub async fn logout(&self, principal: Option<&Principal>, token: Uuid) -> SchedResult<()> {
        let principal = unitsched_core::principal::require(principal)?;

        session_repo::delete_session(&self.pool, token)
            .await
            .map_err(store_error)?;

        info!("User {} logged out", principal.username);
        Ok(())
    }

    pub async fn purge_expired(&self) -> SchedResult<u64> {
        session_repo::delete_expired_sessions(&self.pool)
            .await
            .map_err(store_error)
    }

    /// Creates a login with an already hashed password.
    pub async fn create_operator(&self, username: &str, password_hash: &str) -> SchedResult<Principal> {
        let username = username.trim();
        if username.is_empty() {
            return Err(SchedError::validation("username", "This field may not be blank."));
        }

        let user = user_repo::create_user(&self.pool, username, password_hash)
            .await
            .map_err(|report| {
                if classify(&report).is_unique(USER_USERNAME_UNIQUE) {
                    SchedError::duplicate("username", "A user with that username already exists.")
                } else {
                    store_error(report)
                }
            })?;

        Ok(user.into())
    }
}
