use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use unitsched_core::models::unit::{CreateUnitRequest, Unit, UnitQuery, UpdateUnitRequest};

use crate::{
    middleware::{auth::CurrentSession, error_handling::AppError, json::Json},
    ApiState,
};

#[axum::debug_handler]
pub async fn list_units(
    State(state): State<Arc<ApiState>>,
    session: CurrentSession,
    Query(query): Query<UnitQuery>,
) -> Result<Json<Vec<Unit>>, AppError> {
    Ok(Json(state.units.list(session.principal(), &query).await?))
}

#[axum::debug_handler]
pub async fn get_unit(
    State(state): State<Arc<ApiState>>,
    session: CurrentSession,
    Path(id): Path<i64>,
) -> Result<Json<Unit>, AppError> {
    Ok(Json(state.units.get(session.principal(), id).await?))
}

#[axum::debug_handler]
pub async fn create_unit(
    State(state): State<Arc<ApiState>>,
    session: CurrentSession,
    Json(payload): Json<CreateUnitRequest>,
) -> Result<(StatusCode, Json<Unit>), AppError> {
    let unit = state.units.create(session.principal(), payload).await?;
    Ok((StatusCode::CREATED, Json(unit)))
}

#[axum::debug_handler]
pub async fn update_unit(
    State(state): State<Arc<ApiState>>,
    session: CurrentSession,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUnitRequest>,
) -> Result<Json<Unit>, AppError> {
    Ok(Json(state.units.update(session.principal(), id, payload).await?))
}

#[axum::debug_handler]
pub async fn delete_unit(
    State(state): State<Arc<ApiState>>,
    session: CurrentSession,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.units.delete(session.principal(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
