//! Streaming chat endpoint
//!
//! Serves incremental model output over SSE. Each text delta from the
//! model becomes a `data: {"response": ...}` event; the stream ends with
//! `data: {"done": true}`. Errors after the stream is established are
//! surfaced as a `data: {"error": ...}` event.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
    Json,
};
use bytes::Bytes;
use futures::StreamExt;
use serde_json::json;
use tracing::{info, warn};

use crate::{
    error::AppError,
    persona,
    routes::chat::ChatRequest,
    streaming::{chunk_text, sse_data_payload, SseLineBuffer},
    vertex::types::{GenerationOptions, Part},
    AppState,
};

/// Handle streaming chat requests
pub async fn chat_stream(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::BadRequest("Message must not be empty".to_string()));
    }

    info!(chars = request.message.len(), "Processing streaming chat request");

    let contents = persona::build_contents(
        &request.conversation_history,
        vec![Part::text(request.message.trim())],
        false,
    );
    let options = GenerationOptions::from_request(request.temperature, request.max_tokens);

    // Establishing the stream applies the fallback policy; failures here
    // become a regular HTTP error before any SSE bytes are written.
    let (mut upstream, served_by, model_used) =
        state.chat.generate_stream(contents, options).await?;

    info!(model = %model_used, served_by = served_by.as_str(), "Stream established");

    let event_stream = async_stream::stream! {
        let mut buffer = SseLineBuffer::new();

        while let Some(chunk) = upstream.next().await {
            match chunk {
                Ok(bytes) => {
                    for line in buffer.feed(&bytes) {
                        let Some(payload) = sse_data_payload(&line) else { continue };
                        if let Some(text) = chunk_text(payload) {
                            let cleaned = persona::clean_response_text(&text);
                            if !cleaned.is_empty() {
                                yield Ok::<Bytes, Infallible>(sse_event(json!({ "response": cleaned })));
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Stream error from upstream");
                    yield Ok(sse_event(json!({ "error": format!("Streaming error: {}", e) })));
                    return;
                }
            }
        }

        yield Ok(sse_event(json!({ "done": true })));
    };

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .header("X-Accel-Buffering", "no")
        .body(Body::from_stream(event_stream))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))?;

    Ok(response)
}

/// Format one SSE data event
fn sse_event(payload: serde_json::Value) -> Bytes {
    Bytes::from(format!("data: {}\n\n", payload))
}
