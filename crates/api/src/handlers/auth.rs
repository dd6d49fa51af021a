//! # Session Handlers
//!
//! Login, logout and session introspection for the browser client. A
//! successful login sets an HttpOnly `sessionid` cookie that later requests
//! present back.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use unitsched_core::{
    errors::SchedError,
    models::auth::{DetailResponse, LoginRequest, UserResponse},
};

use crate::{
    middleware::{
        auth::{clear_session_cookie, csrf_cookie, session_cookie, CurrentSession},
        error_handling::AppError,
        json::Json,
    },
    ApiState,
};

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let login = state
        .sessions
        .login(&payload.username, &payload.password)
        .await?;

    let max_age = (login.expires_at - chrono::Utc::now()).num_seconds().max(0);
    let cookie = session_cookie(login.token, max_age, state.secure_cookies);

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse::from(&login.principal)),
    ))
}

#[axum::debug_handler]
pub async fn logout(
    State(state): State<Arc<ApiState>>,
    session: CurrentSession,
) -> Result<impl IntoResponse, AppError> {
    let token = session.token.ok_or(SchedError::Unauthenticated)?;
    state.sessions.logout(session.principal(), token).await?;

    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie(state.secure_cookies))],
    ))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn me(session: CurrentSession) -> Result<Json<UserResponse>, AppError> {
    let principal = session
        .principal()
        .ok_or_else(|| SchedError::Authentication("Not authenticated.".to_string()))?;
    Ok(Json(UserResponse::from(principal)))
}

/// Issues the CSRF cookie the browser client reads before its first write.
#[axum::debug_handler]
pub async fn csrf(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, csrf_cookie(state.secure_cookies))],
        Json(DetailResponse::new("CSRF cookie set")),
    )
}
