//! Image endpoints
//!
//! Upload-and-analyze via the vision-capable model, tourism image search,
//! and Unsplash download tracking.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    images::{self, unsplash::ImageResult},
    persona,
    vertex::types::{Content, GenerationOptions, Part},
    AppState,
};

const DEFAULT_UPLOAD_MESSAGE: &str = "What do you see in this image?";
const DEFAULT_SEARCH_RESULTS: usize = 5;

/// Image analysis response
#[derive(Debug, Serialize)]
pub struct ImageUploadResponse {
    pub analysis: String,
    pub suggestions: Vec<String>,
    pub image_id: String,
    pub processed: bool,
}

/// Image search request body
#[derive(Debug, Deserialize)]
pub struct ImageSearchRequest {
    pub query: String,
    #[serde(default)]
    pub max_results: Option<usize>,
}

/// Image search response
#[derive(Debug, Serialize)]
pub struct ImageSearchResponse {
    pub images: Vec<ImageResult>,
    pub query: String,
    pub total_found: usize,
}

/// Download tracking request body
#[derive(Debug, Deserialize)]
pub struct TrackDownloadRequest {
    pub download_url: String,
}

/// Download tracking result
#[derive(Debug, Serialize)]
pub struct TrackDownloadResponse {
    pub success: bool,
    pub message: String,
}

/// Handle multipart image uploads and analyze them with the model
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ImageUploadResponse>, AppError> {
    let mut file: Option<(Option<String>, bytes::Bytes)> = None;
    let mut message = DEFAULT_UPLOAD_MESSAGE.to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart request: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?;
                file = Some((content_type, data));
            }
            Some("message") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read message: {}", e)))?;
                if !text.trim().is_empty() {
                    message = text;
                }
            }
            _ => {}
        }
    }

    let (content_type, data) =
        file.ok_or_else(|| AppError::BadRequest("Missing 'file' field".to_string()))?;

    // Validation happens entirely before the upstream call
    if let Some(declared) = &content_type {
        images::validate_content_type(declared)?;
    }
    let mime_type = images::validate_image_bytes(&data)?;

    let image_id = Uuid::new_v4().to_string();
    info!(
        image_id = %image_id,
        mime_type = %mime_type,
        size = data.len(),
        "Processing image upload"
    );

    let base64_data = base64::engine::general_purpose::STANDARD.encode(&data);
    let contents = vec![Content::user(vec![
        Part::text(persona::image_analysis_prompt(&message)),
        Part::inline_data(mime_type, base64_data),
    ])];

    // Analysis settings mirror the vision defaults: a bit more personality,
    // a tighter output budget than plain chat.
    let options = GenerationOptions {
        temperature: 0.4,
        max_output_tokens: 1500,
        top_p: 0.9,
        top_k: 40,
    };

    let result = state.chat.generate(contents, options).await?;
    let analysis = persona::clean_response_text(&result.text);
    let suggestions = persona::analysis_suggestions(&analysis);

    info!(
        image_id = %image_id,
        model = %result.model_used,
        served_by = result.served_by.as_str(),
        "Image analysis completed"
    );

    Ok(Json(ImageUploadResponse {
        analysis,
        suggestions,
        image_id,
        processed: true,
    }))
}

/// Search Unsplash for tourism images
pub async fn image_search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ImageSearchRequest>,
) -> AppResult<Json<ImageSearchResponse>> {
    if request.query.trim().is_empty() {
        return Err(AppError::BadRequest("Query must not be empty".to_string()));
    }

    let max_results = request.max_results.unwrap_or(DEFAULT_SEARCH_RESULTS);
    info!(query = %request.query, max_results, "Image search request");

    let images = state.unsplash.search(&request.query, max_results).await;

    Ok(Json(ImageSearchResponse {
        total_found: images.len(),
        images,
        query: request.query,
    }))
}

/// Track an Unsplash image download, as their API terms require
pub async fn track_image_download(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TrackDownloadRequest>,
) -> Json<TrackDownloadResponse> {
    info!(url = %request.download_url, "Tracking image download");

    let success = state.unsplash.track_download(&request.download_url).await;
    Json(TrackDownloadResponse {
        success,
        message: if success {
            "Download tracked".to_string()
        } else {
            "Tracking unavailable".to_string()
        },
    })
}
