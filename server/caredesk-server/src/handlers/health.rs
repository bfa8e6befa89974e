use crate::server::CareDeskServer;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::collections::HashMap;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime: u64,
    pub backend: String,
    pub checks: HashMap<String, String>,
}

/// Reports 503 when the store cannot be reached
pub async fn health_check(State(server): State<CareDeskServer>) -> (StatusCode, Json<HealthResponse>) {
    let mut checks = HashMap::new();
    let healthy = match server.db.store().health_check().await {
        Ok(()) => {
            checks.insert("database".to_string(), "healthy".to_string());
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Store health check failed");
            checks.insert("database".to_string(), "unreachable".to_string());
            false
        }
    };

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: server.uptime_seconds(),
        backend: server.db.backend().to_string(),
        checks,
    };
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}
