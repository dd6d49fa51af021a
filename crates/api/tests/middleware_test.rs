use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{body::to_bytes, http::StatusCode};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};
use unitsched_api::middleware::{auth, error_handling::map_error};
use unitsched_core::errors::{EntityKind, SchedError};

async fn render(error: SchedError) -> (StatusCode, Value) {
    let response = map_error(error);
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    (status, serde_json::from_slice(&bytes).expect("body should be JSON"))
}

#[rstest]
#[case::not_found(
    SchedError::not_found(EntityKind::Allocation, 42),
    StatusCode::NOT_FOUND,
    json!({"detail": "Allocation 42 not found."})
)]
#[case::clash(
    SchedError::SlotAlreadyAllocated { slot_id: 7 },
    StatusCode::BAD_REQUEST,
    json!({"slot_id": "Slot already allocated (clash)."})
)]
#[case::duplicate_code(
    SchedError::duplicate("code", "unit with this code already exists."),
    StatusCode::BAD_REQUEST,
    json!({"code": "unit with this code already exists."})
)]
#[case::validation(
    SchedError::validation("end_time", "End time must be after start time."),
    StatusCode::BAD_REQUEST,
    json!({"end_time": "End time must be after start time."})
)]
#[case::unauthenticated(
    SchedError::Unauthenticated,
    StatusCode::UNAUTHORIZED,
    json!({"detail": "Authentication credentials were not provided."})
)]
#[case::bad_credentials(
    SchedError::Authentication("Invalid username or password.".to_string()),
    StatusCode::UNAUTHORIZED,
    json!({"detail": "Invalid username or password."})
)]
#[tokio::test]
async fn maps_domain_errors(
    #[case] error: SchedError,
    #[case] status: StatusCode,
    #[case] body: Value,
) {
    assert_eq!(render(error).await, (status, body));
}

#[tokio::test]
async fn transient_conflicts_are_409() {
    let (status, body) = render(SchedError::TransientConflict).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn storage_failures_hide_their_cause() {
    let (status, body) = render(SchedError::Database(eyre::eyre!(
        "connection to 10.0.0.5 refused"
    )))
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"detail": "Internal server error."}));
}

#[test]
fn hashed_passwords_verify() {
    let hash = auth::hash_password("correct horse").expect("hashing should succeed");
    let parsed = PasswordHash::new(&hash).expect("hash should be in PHC format");

    assert!(Argon2::default()
        .verify_password(b"correct horse", &parsed)
        .is_ok());
    assert!(Argon2::default()
        .verify_password(b"wrong horse", &parsed)
        .is_err());
}
