//! Configuration management for the Aiman backend
//!
//! Configuration is loaded from environment variables.

use anyhow::{Context, Result};
use std::env;

/// Deployment environment label, derived from the hosting platform's
/// well-known variables at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Cloud,
    Local,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Cloud => "cloud",
            Environment::Local => "local",
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Google Cloud project id
    pub project_id: String,
    /// Google Cloud region hosting the endpoint
    pub location: String,
    /// Fine-tuned model endpoint resource name
    /// (projects/{project}/locations/{location}/endpoints/{id})
    pub vertex_endpoint: String,
    /// Stock model used when the fine-tuned endpoint fails
    pub fallback_model: String,
    /// Base URL for the Vertex AI API (overridable for tests)
    pub vertex_api_base_url: String,

    /// Path to a service-account key file, if configured
    pub credentials_file: Option<String>,
    /// Inline service-account JSON, if configured
    pub credentials_json: Option<String>,

    /// Unsplash API access key for image search (optional)
    pub unsplash_access_key: Option<String>,
    /// Unsplash API base URL (overridable for tests)
    pub unsplash_api_url: String,

    /// Where the process is running (cloud PaaS vs local dev)
    pub environment: Environment,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let project_id =
            env::var("GOOGLE_CLOUD_PROJECT").context("GOOGLE_CLOUD_PROJECT must be set")?;
        let location =
            env::var("GOOGLE_CLOUD_LOCATION").unwrap_or_else(|_| "us-west1".to_string());

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .context("Invalid PORT")?,

            vertex_endpoint: env::var("VERTEX_AI_ENDPOINT")
                .context("VERTEX_AI_ENDPOINT must be set")?,
            fallback_model: env::var("FALLBACK_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            vertex_api_base_url: env::var("VERTEX_API_BASE_URL").unwrap_or_else(|_| {
                format!("https://{}-aiplatform.googleapis.com/v1", location)
            }),

            credentials_file: env::var("GOOGLE_APPLICATION_CREDENTIALS").ok(),
            credentials_json: env::var("GOOGLE_CLOUD_SERVICE_ACCOUNT_JSON").ok(),

            unsplash_access_key: env::var("UNSPLASH_ACCESS_KEY").ok(),
            unsplash_api_url: env::var("UNSPLASH_API_URL")
                .unwrap_or_else(|_| "https://api.unsplash.com".to_string()),

            environment: if env::var("RENDER_SERVICE_NAME").is_ok() {
                Environment::Cloud
            } else {
                Environment::Local
            },

            project_id,
            location,
        })
    }
}
