use axum::{
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/allocations",
            get(handlers::allocations::list_allocations)
                .post(handlers::allocations::create_allocation),
        )
        .route(
            "/api/allocations/:id",
            get(handlers::allocations::get_allocation)
                .put(handlers::allocations::update_allocation)
                .patch(handlers::allocations::update_allocation)
                .delete(handlers::allocations::delete_allocation),
        )
}
