//! HTTP routes for the Aiman backend
//!
//! This module defines all HTTP endpoints exposed by the service.

pub mod chat;
pub mod health;
pub mod images;
pub mod stream;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS is wide open: the frontend is served from a separate origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/chat", post(chat::chat))
        .route("/chat-stream", post(stream::chat_stream))
        .route("/chat-with-image", post(chat::chat_with_image))
        .route("/upload-image", post(images::upload_image))
        .route("/image-search", post(images::image_search))
        .route("/track-image-download", post(images::track_image_download))
        // Axum caps bodies at 2 MiB by default. The largest legitimate body
        // is a ceiling-sized image arriving base64-encoded in JSON (4/3
        // inflation) plus envelope overhead; the image validator remains the
        // authoritative ceiling and answers with a structured 413.
        .layer(DefaultBodyLimit::max(
            crate::images::MAX_IMAGE_BYTES * 4 / 3 + 256 * 1024,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
