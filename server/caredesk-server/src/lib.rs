//! CareDesk Server - hospital administration HTTP API
//!
//! Wires the registry, insurance, billing, pharmacy and accounting services
//! behind an axum router under `/api/v1`. Every response body is either an
//! [`ApiResponse`] envelope or an [`ApiErrorResponse`].

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod types;
pub mod validation;

pub use error::*;
pub use server::CareDeskServer;

use axum::{middleware::from_fn, Router};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Create the main application router with all routes and middleware
pub fn create_app(server: CareDeskServer) -> Router {
    let request_timeout = Duration::from_secs(server.config.server.request_timeout);

    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::create_cors_layer())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(from_fn(middleware::request_timing_middleware)),
        )
        .with_state(server)
}
