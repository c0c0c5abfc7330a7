//! Health check endpoints
//!
//! These report static configuration facts only and never make an
//! outbound call:
//! - `/` - Service banner
//! - `/health` - Configuration summary
//! - `/health/ready` - Readiness probe
//! - `/health/live` - Liveness probe

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// Root banner response
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
    pub status: String,
    pub version: String,
    pub endpoints: Vec<String>,
}

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub model_endpoint: String,
    pub backend_version: String,
    pub environment: String,
    pub credential_source: String,
    pub uptime_seconds: u64,
    pub timestamp: String,
}

/// Simple health response for liveness/readiness
#[derive(Debug, Serialize)]
pub struct SimpleHealthResponse {
    pub status: String,
}

/// Root endpoint
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Malaysia Tourism AI Backend".to_string(),
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: vec![
            "/health".to_string(),
            "/chat".to_string(),
            "/chat-stream".to_string(),
            "/chat-with-image".to_string(),
            "/upload-image".to_string(),
            "/image-search".to_string(),
        ],
    })
}

/// Health check endpoint; static configuration facts, no side effects
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "AI Chat Backend is running".to_string(),
        model_endpoint: state.config.vertex_endpoint.clone(),
        backend_version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.as_str().to_string(),
        credential_source: state.credential_source.as_str().to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Readiness probe endpoint
pub async fn readiness_check() -> (StatusCode, Json<SimpleHealthResponse>) {
    (
        StatusCode::OK,
        Json(SimpleHealthResponse {
            status: "healthy".to_string(),
        }),
    )
}

/// Liveness probe endpoint
pub async fn liveness_check() -> (StatusCode, Json<SimpleHealthResponse>) {
    (
        StatusCode::OK,
        Json(SimpleHealthResponse {
            status: "healthy".to_string(),
        }),
    )
}
