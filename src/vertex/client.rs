//! Vertex AI Gemini HTTP client
//!
//! Sends `generateContent` and `streamGenerateContent` requests to the
//! regional Vertex AI API with bearer-token authentication.

use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use crate::credentials::TokenProvider;
use crate::error::{AppError, AppResult};
use crate::vertex::types::{GenerateContentRequest, GenerateContentResponse};

/// Stream type for streaming responses from the model
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// Gemini client bound to one regional API base URL
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenProvider>,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, base_url: String, tokens: Arc<TokenProvider>) -> Self {
        Self {
            client,
            base_url,
            tokens,
        }
    }

    /// Generate content (non-streaming)
    pub async fn generate(
        &self,
        resource: &str,
        request: &GenerateContentRequest,
    ) -> AppResult<GenerateContentResponse> {
        let url = format!("{}/{}:generateContent", self.base_url, resource);
        debug!(url = %url, "Calling generateContent");

        let response = self
            .client
            .post(&url)
            .headers(self.request_headers().await?)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamError(format!(
                "Vertex AI error {}: {}",
                status, text
            )));
        }

        let result = response.json().await?;
        Ok(result)
    }

    /// Generate content with a server-sent-event response stream
    pub async fn generate_stream(
        &self,
        resource: &str,
        request: &GenerateContentRequest,
    ) -> AppResult<ByteStream> {
        let url = format!(
            "{}/{}:streamGenerateContent?alt=sse",
            self.base_url, resource
        );
        debug!(url = %url, "Calling streamGenerateContent");

        let response = self
            .client
            .post(&url)
            .headers(self.request_headers().await?)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamError(format!(
                "Vertex AI error {}: {}",
                status, text
            )));
        }

        Ok(Box::pin(response.bytes_stream()))
    }

    async fn request_headers(&self) -> AppResult<HeaderMap> {
        let token = self.tokens.access_token().await?;
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid token: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}
