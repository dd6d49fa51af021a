//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and JSON bodies. Field-scoped
//! errors render as `{"<field>": "<message>"}`, everything else as
//! `{"detail": "<message>"}`. Storage and internal failures are logged and
//! reported without their cause.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use tracing::error;
use unitsched_core::errors::SchedError;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```ignore
/// async fn handler(State(state): State<Arc<ApiState>>, session: CurrentSession, Path(id): Path<i64>)
///     -> Result<Json<Unit>, AppError>
/// {
///     Ok(Json(state.units.get(session.principal(), id).await?))
/// }
/// ```
#[derive(Debug)]
pub struct AppError(pub SchedError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SchedError::NotFound { .. } => StatusCode::NOT_FOUND,
            SchedError::SlotAlreadyAllocated { .. }
            | SchedError::DuplicateKey { .. }
            | SchedError::Validation { .. } => StatusCode::BAD_REQUEST,
            SchedError::Unauthenticated | SchedError::Authentication(_) => {
                StatusCode::UNAUTHORIZED
            }
            SchedError::TransientConflict => StatusCode::CONFLICT,
            SchedError::Database(_) | SchedError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> Value {
        let mut body = Map::new();
        match (&self.0, self.0.field()) {
            (err, Some(field)) => {
                body.insert(field.to_string(), Value::String(err.to_string()));
            }
            (SchedError::Database(_) | SchedError::Internal(_), None) => {
                body.insert(
                    "detail".to_string(),
                    Value::String("Internal server error.".to_string()),
                );
            }
            (err, None) => {
                body.insert("detail".to_string(), Value::String(err.to_string()));
            }
        }
        Value::Object(body)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:?}", self.0);
        }

        (status, Json(self.body())).into_response()
    }
}

/// Automatic conversion from SchedError to AppError
impl From<SchedError> for AppError {
    fn from(err: SchedError) -> Self {
        AppError(err)
    }
}

/// Automatic conversion from eyre::Report, treated as a storage failure
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(SchedError::Database(err))
    }
}

/// Maps a SchedError to an HTTP response
pub fn map_error(err: SchedError) -> Response {
    AppError(err).into_response()
}
