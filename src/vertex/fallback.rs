//! Fallback policy between the fine-tuned endpoint and the stock model
//!
//! The primary attempt always goes to the fine-tuned endpoint. Any failure
//! there triggers exactly one retry against the configured stock model with
//! the same request; a failure on that path propagates to the caller.
//! There is no backoff and no second retry.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::vertex::client::{ByteStream, GeminiClient};
use crate::vertex::types::{
    default_safety_settings, Content, GenerateContentRequest, GenerationOptions, ModelTarget,
};

/// Which step of the two-step strategy produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedBy {
    Primary,
    Fallback,
}

impl ServedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServedBy::Primary => "primary",
            ServedBy::Fallback => "fallback",
        }
    }
}

/// Generated text, tagged with the model that actually served it
#[derive(Debug, Clone)]
pub struct InferenceResult {
    pub text: String,
    pub model_used: String,
    pub served_by: ServedBy,
}

/// Chat inference with the fixed primary/fallback strategy
pub struct ChatService {
    client: GeminiClient,
    primary: ModelTarget,
    fallback: ModelTarget,
    project_id: String,
    location: String,
}

impl ChatService {
    pub fn new(client: GeminiClient, config: &Config) -> Self {
        Self {
            client,
            primary: ModelTarget::Endpoint(config.vertex_endpoint.clone()),
            fallback: ModelTarget::PublisherModel(config.fallback_model.clone()),
            project_id: config.project_id.clone(),
            location: config.location.clone(),
        }
    }

    /// Test constructor with explicit targets
    #[cfg(any(test, feature = "test-utils"))]
    pub fn with_targets(
        client: GeminiClient,
        primary: ModelTarget,
        fallback: ModelTarget,
        project_id: &str,
        location: &str,
    ) -> Self {
        Self {
            client,
            primary,
            fallback,
            project_id: project_id.to_string(),
            location: location.to_string(),
        }
    }

    fn build_request(
        &self,
        contents: Vec<Content>,
        options: GenerationOptions,
    ) -> GenerateContentRequest {
        GenerateContentRequest {
            contents,
            generation_config: options.to_wire(),
            safety_settings: default_safety_settings(),
        }
    }

    /// Generate a full response, falling back once on primary failure
    pub async fn generate(
        &self,
        contents: Vec<Content>,
        options: GenerationOptions,
    ) -> AppResult<InferenceResult> {
        let request = self.build_request(contents, options);

        let primary_resource = self.primary.resource(&self.project_id, &self.location);
        match self.client.generate(&primary_resource, &request).await {
            Ok(response) => {
                info!(model = %self.primary.reported_name(), "Primary endpoint served request");
                Ok(InferenceResult {
                    text: response.text(),
                    model_used: self.primary.reported_name(),
                    served_by: ServedBy::Primary,
                })
            }
            Err(primary_err) => {
                warn!(
                    error = %primary_err,
                    fallback = %self.fallback.reported_name(),
                    "Primary endpoint failed, retrying once with fallback model"
                );

                let fallback_resource = self.fallback.resource(&self.project_id, &self.location);
                let response = self.client.generate(&fallback_resource, &request).await?;
                Ok(InferenceResult {
                    text: response.text(),
                    model_used: self.fallback.reported_name(),
                    served_by: ServedBy::Fallback,
                })
            }
        }
    }

    /// Open a response stream, falling back once if the primary stream
    /// cannot be established. Errors after the first byte are the caller's
    /// to surface.
    pub async fn generate_stream(
        &self,
        contents: Vec<Content>,
        options: GenerationOptions,
    ) -> AppResult<(ByteStream, ServedBy, String)> {
        let request = self.build_request(contents, options);

        let primary_resource = self.primary.resource(&self.project_id, &self.location);
        match self.client.generate_stream(&primary_resource, &request).await {
            Ok(stream) => Ok((stream, ServedBy::Primary, self.primary.reported_name())),
            Err(primary_err) => {
                warn!(
                    error = %primary_err,
                    fallback = %self.fallback.reported_name(),
                    "Primary stream failed, retrying once with fallback model"
                );

                let fallback_resource = self.fallback.resource(&self.project_id, &self.location);
                let stream = self
                    .client
                    .generate_stream(&fallback_resource, &request)
                    .await?;
                Ok((stream, ServedBy::Fallback, self.fallback.reported_name()))
            }
        }
    }
}

/// Build a ChatService wired to the process configuration
pub fn build_chat_service(
    http_client: reqwest::Client,
    config: &Config,
    tokens: Arc<crate::credentials::TokenProvider>,
) -> ChatService {
    let client = GeminiClient::new(http_client, config.vertex_api_base_url.clone(), tokens);
    ChatService::new(client, config)
}
