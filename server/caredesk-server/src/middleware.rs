//! Cross-cutting HTTP middleware

use axum::{
    extract::Request,
    http::{header, Method},
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};

const SLOW_REQUEST: Duration = Duration::from_secs(1);

/// Log requests that take longer than a second
pub async fn request_timing_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();
    let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);

    if duration > SLOW_REQUEST {
        tracing::warn!(
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            duration_ms,
            "Slow request detected"
        );
    } else {
        tracing::debug!(
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            duration_ms,
            "Request completed"
        );
    }

    response
}

/// CORS for the admin front-end
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}
