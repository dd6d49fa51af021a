use axum::{
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/units",
            get(handlers::units::list_units).post(handlers::units::create_unit),
        )
        .route(
            "/api/units/:id",
            get(handlers::units::get_unit)
                .put(handlers::units::update_unit)
                .patch(handlers::units::update_unit)
                .delete(handlers::units::delete_unit),
        )
}
