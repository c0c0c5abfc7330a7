//! Gemini `generateContent` wire types
//!
//! Request and response structures for the Vertex AI Gemini API,
//! serialized with the API's camelCase field names.

use serde::{Deserialize, Serialize};

/// A conversation turn sent to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: "user".to_string(),
            parts,
        }
    }

    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            role: "model".to_string(),
            parts,
        }
    }
}

/// One part of a turn: text or inline binary data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline_data(mime_type: impl Into<String>, base64_data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: base64_data.into(),
            }),
        }
    }
}

/// Base64-encoded binary payload (images)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Generation parameters as sent on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: i32,
    pub max_output_tokens: u32,
}

/// Safety filter setting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

/// The four harm categories, disabled as the fine-tuned model expects
pub fn default_safety_settings() -> Vec<SafetySetting> {
    [
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_HARASSMENT",
    ]
    .iter()
    .map(|category| SafetySetting {
        category: category.to_string(),
        threshold: "OFF".to_string(),
    })
    .collect()
}

/// Full generateContent request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
    pub safety_settings: Vec<SafetySetting>,
}

/// generateContent response body
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    pub model_version: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts
    pub fn text(&self) -> String {
        self.candidates
            .as_deref()
            .and_then(|c| c.first())
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub index: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

/// Bounds-checked generation parameters.
///
/// Client-supplied values are clamped to documented ranges before any
/// request is constructed: temperature 0.0..=2.0, max_output_tokens
/// 1..=8192, top_p 0.0..=1.0, top_k 1..=100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
    pub top_k: i32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 8192,
            top_p: 0.95,
            top_k: 40,
        }
    }
}

impl GenerationOptions {
    /// Build options from per-request overrides, clamping out-of-range values
    pub fn from_request(temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        let defaults = Self::default();
        Self {
            temperature: temperature
                .unwrap_or(defaults.temperature)
                .clamp(0.0, 2.0),
            max_output_tokens: max_tokens
                .unwrap_or(defaults.max_output_tokens)
                .clamp(1, 8192),
            top_p: defaults.top_p,
            top_k: defaults.top_k,
        }
    }

    pub fn to_wire(self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            top_p: self.top_p.clamp(0.0, 1.0),
            top_k: self.top_k.clamp(1, 100),
            max_output_tokens: self.max_output_tokens,
        }
    }
}

/// Which model a request is aimed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelTarget {
    /// Fine-tuned endpoint, by full resource name
    Endpoint(String),
    /// Stock publisher model, by bare model id
    PublisherModel(String),
}

impl ModelTarget {
    /// Resource path used in the request URL
    pub fn resource(&self, project: &str, location: &str) -> String {
        match self {
            ModelTarget::Endpoint(name) => name.clone(),
            ModelTarget::PublisherModel(model) => format!(
                "projects/{}/locations/{}/publishers/google/models/{}",
                project, location, model
            ),
        }
    }

    /// Model name reported to clients in `model_used`
    pub fn reported_name(&self) -> String {
        match self {
            ModelTarget::Endpoint(name) => format!("vertex-ai-{}", name),
            ModelTarget::PublisherModel(model) => model.clone(),
        }
    }
}
