//! Common test utilities for the Aiman backend
//!
//! Shared test harness, mock servers, and fixtures used across the
//! integration test suites.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aiman::{
    config::{Config, Environment},
    routes,
    vertex::{types::ModelTarget, ChatService, GeminiClient},
    AppState, CredentialMaterial, TokenProvider, UnsplashClient,
};

/// Test configuration constants
pub mod constants {
    /// Primary fine-tuned endpoint resource name
    pub const TEST_ENDPOINT: &str = "projects/test-project/locations/us-west1/endpoints/123";
    /// Fallback stock model id
    pub const TEST_FALLBACK_MODEL: &str = "gemini-2.0-flash";
    /// Reported model name for primary-served responses
    pub const TEST_PRIMARY_MODEL_USED: &str =
        "vertex-ai-projects/test-project/locations/us-west1/endpoints/123";
    /// Unsplash test key
    pub const TEST_UNSPLASH_KEY: &str = "test-unsplash-key";
}

/// Resource path of the primary generateContent call on the mock server
pub fn primary_path() -> String {
    format!("/{}:generateContent", constants::TEST_ENDPOINT)
}

/// Resource path of the primary streaming call
pub fn primary_stream_path() -> String {
    format!("/{}:streamGenerateContent", constants::TEST_ENDPOINT)
}

/// Resource path of the fallback generateContent call
pub fn fallback_path() -> String {
    format!(
        "/projects/test-project/locations/us-west1/publishers/google/models/{}:generateContent",
        constants::TEST_FALLBACK_MODEL
    )
}

/// Resource path of the fallback streaming call
pub fn fallback_stream_path() -> String {
    format!(
        "/projects/test-project/locations/us-west1/publishers/google/models/{}:streamGenerateContent",
        constants::TEST_FALLBACK_MODEL
    )
}

/// An SSE body carrying one generateContent chunk per text delta
pub fn sse_body(chunks: &[&str]) -> String {
    let mut body = String::new();
    for chunk in chunks {
        body.push_str(&format!("data: {}\n\n", model_response(chunk)));
    }
    body
}

/// A generateContent response body with the given text
pub fn model_response(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 8, "totalTokenCount": 18}
    })
}

/// Complete test environment: app server plus mock Vertex and Unsplash APIs
pub struct TestHarness {
    pub server: TestServer,
    pub vertex: MockServer,
    pub unsplash: MockServer,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::build(true).await
    }

    /// Harness without an Unsplash key, for curated-fallback behavior
    pub async fn new_without_unsplash_key() -> Self {
        Self::build(false).await
    }

    async fn build(with_unsplash_key: bool) -> Self {
        let vertex = MockServer::start().await;
        let unsplash = MockServer::start().await;

        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            project_id: "test-project".to_string(),
            location: "us-west1".to_string(),
            vertex_endpoint: constants::TEST_ENDPOINT.to_string(),
            fallback_model: constants::TEST_FALLBACK_MODEL.to_string(),
            vertex_api_base_url: vertex.uri(),
            credentials_file: None,
            credentials_json: None,
            unsplash_access_key: with_unsplash_key
                .then(|| constants::TEST_UNSPLASH_KEY.to_string()),
            unsplash_api_url: unsplash.uri(),
            environment: Environment::Local,
        };

        let http_client = reqwest::Client::new();
        let tokens = Arc::new(TokenProvider::new(
            CredentialMaterial::StaticToken("test-token".to_string()),
            http_client.clone(),
        ));
        let gemini = GeminiClient::new(http_client.clone(), vertex.uri(), tokens);
        let chat = Arc::new(ChatService::with_targets(
            gemini,
            ModelTarget::Endpoint(constants::TEST_ENDPOINT.to_string()),
            ModelTarget::PublisherModel(constants::TEST_FALLBACK_MODEL.to_string()),
            "test-project",
            "us-west1",
        ));
        let unsplash_client = Arc::new(UnsplashClient::new(
            http_client,
            unsplash.uri(),
            config.unsplash_access_key.clone(),
        ));

        let state = Arc::new(AppState::new_for_testing(config, chat, unsplash_client));
        let app = routes::create_router(state);
        let server = TestServer::new(app).expect("Failed to create test server");

        Self {
            server,
            vertex,
            unsplash,
        }
    }

    /// Primary endpoint answers with the given text
    pub async fn mock_primary_success(&self, text: &str) {
        Mock::given(method("POST"))
            .and(path(primary_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(model_response(text)))
            .mount(&self.vertex)
            .await;
    }

    /// Primary endpoint fails with the given status
    pub async fn mock_primary_failure(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(primary_path()))
            .respond_with(ResponseTemplate::new(status).set_body_string("endpoint error"))
            .mount(&self.vertex)
            .await;
    }

    /// Fallback model answers with the given text, expecting exactly
    /// `expected_calls` invocations
    pub async fn mock_fallback(&self, text: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(fallback_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(model_response(text)))
            .expect(expected_calls)
            .mount(&self.vertex)
            .await;
    }

    /// Assert that no Vertex call of any kind is made
    pub async fn expect_no_vertex_calls(&self) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.vertex)
            .await;
    }

    /// Primary streaming call answers with a canned SSE body
    pub async fn mock_primary_stream(&self, chunks: &[&str]) {
        Mock::given(method("POST"))
            .and(path(primary_stream_path()))
            .and(query_param("alt", "sse"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(sse_body(chunks))
                    .insert_header("content-type", "text/event-stream"),
            )
            .mount(&self.vertex)
            .await;
    }

    /// Primary streaming call fails with the given status
    pub async fn mock_primary_stream_failure(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(primary_stream_path()))
            .and(query_param("alt", "sse"))
            .respond_with(ResponseTemplate::new(status).set_body_string("endpoint error"))
            .expect(1)
            .mount(&self.vertex)
            .await;
    }

    /// Fallback streaming call answers with a canned SSE body, expecting
    /// exactly `expected_calls` invocations
    pub async fn mock_fallback_stream(&self, chunks: &[&str], expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(fallback_stream_path()))
            .and(query_param("alt", "sse"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(sse_body(chunks))
                    .insert_header("content-type", "text/event-stream"),
            )
            .expect(expected_calls)
            .mount(&self.vertex)
            .await;
    }
}

/// Sample request data for tests
pub mod test_data {
    use serde_json::json;

    /// Minimal valid chat request
    pub fn valid_chat_request() -> serde_json::Value {
        json!({"message": "Tell me about Penang food"})
    }

    /// Chat request with an empty message
    pub fn empty_chat_request() -> serde_json::Value {
        json!({"message": "   "})
    }

    /// Chat request with history and overrides
    pub fn chat_request_with_history() -> serde_json::Value {
        json!({
            "message": "more ideas please",
            "temperature": 0.9,
            "max_tokens": 2048,
            "conversation_history": [
                {"role": "user", "content": "tell me about Langkawi"},
                {"role": "assistant", "content": "Langkawi is lovely"},
                {"role": "user", "content": "and Tioman?"},
                {"role": "assistant", "content": {"response": "Also lovely", "phase": "ideation"}}
            ]
        })
    }

    /// A tiny but valid PNG payload (magic bytes plus filler)
    pub fn png_bytes() -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0u8; 64]);
        bytes
    }

    /// A tiny but valid JPEG payload
    pub fn jpeg_bytes() -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.extend_from_slice(&[0u8; 64]);
        bytes
    }
}
