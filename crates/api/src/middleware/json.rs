//! # JSON Bodies
//!
//! A `Json` extractor whose failures go through [`AppError`], so malformed
//! or incomplete bodies produce the same `{"<field>": "<message>"}` shape as
//! every other client error.
//!
//! When the handler also takes a [`CurrentSession`], the session is checked
//! before the body is read: an anonymous request is always rejected as
//! unauthenticated, whatever it sent.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use unitsched_core::{
    errors::{SchedError, SchedResult},
    principal,
};

use crate::middleware::{auth::CurrentSession, error_handling::AppError};

pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// JSON request body or response payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = req.extensions().get::<CurrentSession>() {
            principal::require(session.principal())?;
        }

        let json_content = is_json_content(req.headers());
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| SchedError::validation(NON_FIELD_ERRORS, rejection.body_text()))?;

        Ok(Json(parse_body(&bytes, json_content)?))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

fn is_json_content(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Decodes a request body. An empty body reads as `{}`, so required fields
/// are reported as missing rather than the body as absent.
pub fn parse_body<T: DeserializeOwned>(bytes: &[u8], json_content: bool) -> SchedResult<T> {
    let value = if bytes.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Map::new())
    } else if !json_content {
        return Err(SchedError::validation(
            NON_FIELD_ERRORS,
            "Unsupported media type; expected application/json.",
        ));
    } else {
        serde_json::from_slice(bytes).map_err(|e| {
            SchedError::validation(NON_FIELD_ERRORS, format!("JSON parse error - {e}"))
        })?
    };

    if !value.is_object() {
        return Err(SchedError::validation(
            NON_FIELD_ERRORS,
            "Invalid data. Expected a dictionary.",
        ));
    }

    serde_json::from_value(value).map_err(data_error)
}

fn data_error(err: serde_json::Error) -> SchedError {
    let message = err.to_string();
    match message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next())
    {
        Some(field) => SchedError::validation(field, "This field is required."),
        None => SchedError::validation(NON_FIELD_ERRORS, message),
    }
}
