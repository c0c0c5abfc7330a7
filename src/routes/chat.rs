//! Chat endpoints
//!
//! Text chat and image-context chat against the fine-tuned endpoint,
//! with the single-step fallback applied by the chat service.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::AppError,
    images,
    persona::{self, HistoryTurn},
    vertex::types::{GenerationOptions, Part},
    AppState,
};

/// Chat request body
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub conversation_history: Vec<HistoryTurn>,
    #[serde(default)]
    pub user_session_id: Option<String>,
}

/// Chat request with an optional base64-encoded image
#[derive(Debug, Clone, Deserialize)]
pub struct ChatWithImageRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub conversation_history: Vec<HistoryTurn>,
    #[serde(default)]
    pub user_session_id: Option<String>,
}

/// Chat response body
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub model_used: String,
    pub phase: String,
    pub contains_images: bool,
    pub contains_actions: bool,
}

/// Handle text chat requests
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let start_time = Instant::now();

    if request.message.trim().is_empty() {
        return Err(AppError::BadRequest("Message must not be empty".to_string()));
    }

    info!(
        chars = request.message.len(),
        history = request.conversation_history.len(),
        session = request.user_session_id.as_deref().unwrap_or("-"),
        "Processing chat request"
    );

    let phase = persona::determine_phase(&request.conversation_history, &request.message);
    let contents = persona::build_contents(
        &request.conversation_history,
        vec![Part::text(request.message.trim())],
        false,
    );
    let options = GenerationOptions::from_request(request.temperature, request.max_tokens);

    let result = state.chat.generate(contents, options).await?;
    let response = persona::clean_response_text(&result.text);
    let directives = persona::scan_directives(&response);

    info!(
        model = %result.model_used,
        served_by = result.served_by.as_str(),
        phase = phase.as_str(),
        duration_ms = %format!("{:.2}", start_time.elapsed().as_secs_f64() * 1000.0),
        "Chat request completed"
    );

    Ok(Json(ChatResponse {
        response,
        model_used: result.model_used,
        phase: phase.as_str().to_string(),
        contains_images: directives.contains_images,
        contains_actions: directives.contains_actions,
    }))
}

/// Handle chat requests that carry an uploaded image as context
pub async fn chat_with_image(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatWithImageRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let start_time = Instant::now();

    let message = request.message.trim();
    if message.is_empty() && request.image_data.is_none() {
        return Err(AppError::BadRequest(
            "Request must carry a message or an image".to_string(),
        ));
    }

    // Decode and validate the image before anything goes over the wire
    let mut parts = vec![Part::text(if message.is_empty() {
        "What do you see in this image?"
    } else {
        message
    })];
    let has_image = if let Some(image_data) = &request.image_data {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(image_data)
            .map_err(|_| AppError::BadRequest("Invalid base64 image data".to_string()))?;
        let mime_type = images::validate_image_bytes(&bytes)?;
        parts.push(Part::inline_data(mime_type, image_data.clone()));
        true
    } else {
        false
    };

    info!(
        chars = message.len(),
        has_image,
        image_id = request.image_id.as_deref().unwrap_or("-"),
        "Processing chat-with-image request"
    );

    let phase = persona::determine_phase(&request.conversation_history, message);
    let contents = persona::build_contents(&request.conversation_history, parts, has_image);
    let options = GenerationOptions::from_request(request.temperature, request.max_tokens);

    let result = state.chat.generate(contents, options).await?;
    let response = persona::clean_response_text(&result.text);
    let directives = persona::scan_directives(&response);

    info!(
        model = %result.model_used,
        served_by = result.served_by.as_str(),
        duration_ms = %format!("{:.2}", start_time.elapsed().as_secs_f64() * 1000.0),
        "Chat-with-image request completed"
    );

    Ok(Json(ChatResponse {
        response,
        model_used: result.model_used,
        phase: phase.as_str().to_string(),
        contains_images: directives.contains_images,
        contains_actions: directives.contains_actions,
    }))
}
