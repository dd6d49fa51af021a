//! # Unit Scheduler API
//!
//! The API crate provides the web server for the unit scheduler. It exposes
//! CRUD endpoints for units, weekly slots and allocations, plus the session
//! endpoints the browser client logs in with.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Extract the request and call the matching service
//! - **Middleware**: Session resolution and error-to-response mapping
//! - **Config**: Handle environment and application configuration
//!
//! Business rules, including the one-allocation-per-slot rule, live in the
//! services of the `unitsched-db` crate.

/// Configuration module for API settings
pub mod config;
/// Request handlers, one module per resource
pub mod handlers;
/// Session extraction and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    Router,
};
use eyre::{Result, WrapErr};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use unitsched_db::{
    services::{
        allocation::AllocationService,
        session::SessionService,
        slot::SlotService,
        unit::UnitService,
    },
    DbPool,
};

/// Shared application state that is accessible to all request handlers
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(ApiState::new(db_pool));
/// let app = build_router(state);
/// ```
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: DbPool,
    pub units: UnitService,
    pub slots: SlotService,
    pub allocations: AllocationService,
    pub sessions: SessionService,
    /// Whether session cookies carry the `Secure` attribute
    pub secure_cookies: bool,
}

impl ApiState {
    /// State with the default session lifetime and retry budget.
    pub fn new(db_pool: DbPool) -> Self {
        Self::from_config(&config::ApiConfig::default(), db_pool)
    }

    pub fn from_config(config: &config::ApiConfig, db_pool: DbPool) -> Self {
        Self {
            units: UnitService::new(db_pool.clone()),
            slots: SlotService::new(db_pool.clone()),
            allocations: AllocationService::new(db_pool.clone())
                .with_max_retries(config.allocation_max_retries),
            sessions: SessionService::new(db_pool.clone(), config.session_ttl()),
            secure_cookies: config.secure_cookies,
            db_pool,
        }
    }
}

/// Builds the application router with all routes attached to `state`.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Session endpoints
        .merge(routes::auth::routes())
        // Catalog endpoints
        .merge(routes::units::routes())
        .merge(routes::slots::routes())
        // Allocation endpoints
        .merge(routes::allocations::routes())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .wrap_err_with(|| format!("Invalid CORS origin: {origin}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static("x-csrftoken"),
        ])
        .allow_origin(origins)
        .allow_credentials(true))
}

/// Starts the API server with the provided configuration and database connection
///
/// Installs the tracing subscriber, builds the router and serves it until the
/// process is stopped.
///
/// # Example
///
/// ```ignore
/// let config = ApiConfig::from_env()?;
/// let db_pool = create_pool(&config.database_url, config.database_max_connections).await?;
/// start_server(config, db_pool).await?;
/// ```
pub async fn start_server(config: config::ApiConfig, db_pool: DbPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let state = Arc::new(ApiState::from_config(&config, db_pool));
    let app = build_router(state);

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)?),
        None => app,
    };

    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout))),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_rejects_malformed_origins() {
        assert!(cors_layer(&["http://localhost:5173".to_string()]).is_ok());
        assert!(cors_layer(&["http://bad\norigin".to_string()]).is_err());
    }
}
