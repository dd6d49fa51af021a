use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use unitsched_core::models::slot::{CreateSlotRequest, Slot, SlotQuery, UpdateSlotRequest};

use crate::{
    middleware::{auth::CurrentSession, error_handling::AppError, json::Json},
    ApiState,
};

#[axum::debug_handler]
pub async fn list_slots(
    State(state): State<Arc<ApiState>>,
    session: CurrentSession,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Vec<Slot>>, AppError> {
    Ok(Json(state.slots.list(session.principal(), &query).await?))
}

#[axum::debug_handler]
pub async fn get_slot(
    State(state): State<Arc<ApiState>>,
    session: CurrentSession,
    Path(id): Path<i64>,
) -> Result<Json<Slot>, AppError> {
    Ok(Json(state.slots.get(session.principal(), id).await?))
}

#[axum::debug_handler]
pub async fn create_slot(
    State(state): State<Arc<ApiState>>,
    session: CurrentSession,
    Json(payload): Json<CreateSlotRequest>,
) -> Result<(StatusCode, Json<Slot>), AppError> {
    let slot = state.slots.create(session.principal(), payload).await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

#[axum::debug_handler]
pub async fn update_slot(
    State(state): State<Arc<ApiState>>,
    session: CurrentSession,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSlotRequest>,
) -> Result<Json<Slot>, AppError> {
    Ok(Json(state.slots.update(session.principal(), id, payload).await?))
}

#[axum::debug_handler]
pub async fn delete_slot(
    State(state): State<Arc<ApiState>>,
    session: CurrentSession,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.slots.delete(session.principal(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
