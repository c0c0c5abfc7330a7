//! Aiman - Tourism concierge chat backend
//!
//! This library provides the core functionality for the Aiman backend.
//! It proxies chat requests to a fine-tuned Gemini endpoint on Vertex AI,
//! with a single fixed fallback to a stock model, and serves the tourism
//! image search consumed by the frontend.

pub mod config;
pub mod credentials;
pub mod error;
pub mod images;
pub mod persona;
pub mod routes;
pub mod streaming;
pub mod vertex;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::info;

pub use crate::config::Config;
pub use crate::credentials::{CredentialMaterial, CredentialSource, TokenProvider};
pub use crate::images::UnsplashClient;
pub use crate::vertex::{ChatService, GeminiClient, InferenceResult, ServedBy};

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    pub start_time: Instant,
    /// Which credential source won at startup, for the health report
    pub credential_source: CredentialSource,
    /// Chat inference with the primary/fallback strategy
    pub chat: Arc<ChatService>,
    /// Tourism image search
    pub unsplash: Arc<UnsplashClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Resolves credentials once; all later requests share the resulting
    /// material read-only.
    pub async fn new(config: Config) -> Result<Self> {
        // HTTP client with connection pooling, shared by all outbound calls
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .timeout(std::time::Duration::from_secs(300))
            .build()?;

        let material = credentials::resolve(&config, &http_client).await?;
        let credential_source = material.source();
        info!(source = credential_source.as_str(), "Credentials resolved");

        let tokens = Arc::new(TokenProvider::new(material, http_client.clone()));

        let chat = Arc::new(vertex::fallback::build_chat_service(
            http_client.clone(),
            &config,
            tokens,
        ));

        let unsplash = Arc::new(UnsplashClient::new(
            http_client.clone(),
            config.unsplash_api_url.clone(),
            config.unsplash_access_key.clone(),
        ));

        Ok(Self {
            config,
            http_client,
            start_time: Instant::now(),
            credential_source,
            chat,
            unsplash,
        })
    }

    /// Create application state with externally constructed services,
    /// used by integration tests to point at mock servers.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn new_for_testing(
        config: Config,
        chat: Arc<ChatService>,
        unsplash: Arc<UnsplashClient>,
    ) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
            start_time: Instant::now(),
            credential_source: CredentialSource::ApplicationDefault,
            chat,
            unsplash,
        }
    }
}
