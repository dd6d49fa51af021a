//! # Allocation Handlers
//!
//! Thin adapters over [`AllocationService`](unitsched_db::services::allocation::AllocationService):
//! each handler passes the request's principal through and lets the service
//! enforce authentication and the one-allocation-per-slot rule.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use unitsched_core::models::allocation::{
    Allocation, CreateAllocationRequest, UpdateAllocationRequest,
};

use crate::{
    middleware::{auth::CurrentSession, error_handling::AppError, json::Json},
    ApiState,
};

/// Lists allocations newest first, each with its unit and slot.
#[axum::debug_handler]
pub async fn list_allocations(
    State(state): State<Arc<ApiState>>,
    session: CurrentSession,
) -> Result<Json<Vec<Allocation>>, AppError> {
    let allocations = state.allocations.list(session.principal()).await?;
    Ok(Json(allocations))
}

#[axum::debug_handler]
pub async fn get_allocation(
    State(state): State<Arc<ApiState>>,
    session: CurrentSession,
    Path(id): Path<i64>,
) -> Result<Json<Allocation>, AppError> {
    let allocation = state.allocations.get(session.principal(), id).await?;
    Ok(Json(allocation))
}

/// Assigns a unit to a slot; `400 {"slot_id": ...}` if the slot is taken.
#[axum::debug_handler]
pub async fn create_allocation(
    State(state): State<Arc<ApiState>>,
    session: CurrentSession,
    Json(payload): Json<CreateAllocationRequest>,
) -> Result<(StatusCode, Json<Allocation>), AppError> {
    let allocation = state
        .allocations
        .create(session.principal(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(allocation)))
}

/// Handles both PUT and PATCH; absent fields keep their current value.
#[axum::debug_handler]
pub async fn update_allocation(
    State(state): State<Arc<ApiState>>,
    session: CurrentSession,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateAllocationRequest>,
) -> Result<Json<Allocation>, AppError> {
    let allocation = state
        .allocations
        .update(session.principal(), id, payload)
        .await?;
    Ok(Json(allocation))
}

#[axum::debug_handler]
pub async fn delete_allocation(
    State(state): State<Arc<ApiState>>,
    session: CurrentSession,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.allocations.delete(session.principal(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
