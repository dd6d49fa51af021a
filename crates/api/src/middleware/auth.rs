//! # Authentication Module
//!
//! Password hashing for operator accounts and the session extractor that
//! resolves the current principal for every request.
//!
//! A session token is read from the `sessionid` cookie, or from an
//! `Authorization: Bearer <token>` header for non-browser clients. A missing
//! or unknown token is not an error here: handlers pass the resolved
//! principal (or `None`) to the services, which decide whether to reject.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHasher,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use eyre::Result;
use rand::{distributions::Alphanumeric, Rng};
use unitsched_core::principal::Principal;
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

pub const SESSION_COOKIE: &str = "sessionid";
pub const CSRF_COOKIE: &str = "csrftoken";

/// Hashes a password using the Argon2 algorithm
///
/// Returns the hash in PHC string format (algorithm, parameters, salt and
/// hash), ready to store in `users.password_hash`.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Extracts the session token from the request headers, if one is present
/// and well formed.
pub fn session_token(headers: &HeaderMap) -> Option<Uuid> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|token| Uuid::parse_str(token.trim()).ok());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

pub fn session_cookie(token: Uuid, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// A fresh CSRF cookie; left readable by scripts so the SPA can echo it back
/// in the `X-CSRFToken` header.
pub fn csrf_cookie(secure: bool) -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    let mut cookie = format!("{CSRF_COOKIE}={token}; Path=/; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// The session attached to a request.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    pub token: Option<Uuid>,
    pub principal: Option<Principal>,
}

impl CurrentSession {
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let session = match session_token(&parts.headers) {
            Some(token) => Self {
                token: Some(token),
                principal: state.sessions.resolve(token).await?,
            },
            None => Self::default(),
        };

        // Lets the body extractor reject anonymous requests before parsing
        parts.extensions.insert(session.clone());
        Ok(session)
    }
}
