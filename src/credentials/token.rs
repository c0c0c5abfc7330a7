//! OAuth2 access-token acquisition
//!
//! Exchanges resolved credential material for short-lived bearer tokens.
//! Service-account keys sign their own RS256 assertion; application-default
//! credentials come from the metadata server. Tokens are cached and
//! refreshed shortly before expiry.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::credentials::{CredentialMaterial, ServiceAccountKey};
use crate::error::{AppError, AppResult};

/// Scope required for Vertex AI calls
const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Refresh tokens this long before they actually expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// JWT claims for the service-account assertion
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

/// Token endpoint response (both OAuth2 exchange and metadata server)
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Provides cached bearer tokens for the resolved credential material.
///
/// The cache is the only mutable credential state in the process.
pub struct TokenProvider {
    material: CredentialMaterial,
    http: reqwest::Client,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(material: CredentialMaterial, http: reqwest::Client) -> Self {
        Self {
            material,
            http,
            cached: RwLock::new(None),
        }
    }

    /// Get a valid access token, fetching a fresh one if the cached token
    /// is missing or close to expiry.
    pub async fn access_token(&self) -> AppResult<String> {
        if let Some(cached) = self.cached.read().await.as_ref() {
            if cached.expires_at > Instant::now() + EXPIRY_MARGIN {
                return Ok(cached.token.clone());
            }
        }

        let (token, expires_in) = self.fetch_token().await?;
        let mut guard = self.cached.write().await;
        *guard = Some(CachedToken {
            token: token.clone(),
            expires_at: Instant::now() + Duration::from_secs(expires_in),
        });
        Ok(token)
    }

    async fn fetch_token(&self) -> AppResult<(String, u64)> {
        match &self.material {
            CredentialMaterial::ServiceAccount { key, .. } => {
                self.exchange_assertion(key).await
            }
            CredentialMaterial::ApplicationDefault { metadata_url } => {
                self.fetch_metadata_token(metadata_url).await
            }
            #[cfg(any(test, feature = "test-utils"))]
            CredentialMaterial::StaticToken(token) => Ok((token.clone(), 3600)),
        }
    }

    /// Sign a JWT assertion with the key and exchange it at the token URI
    async fn exchange_assertion(&self, key: &ServiceAccountKey) -> AppResult<(String, u64)> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AppError::Internal(anyhow!("system clock error: {}", e)))?
            .as_secs();

        let claims = AssertionClaims {
            iss: &key.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: &key.token_uri,
            iat: now,
            exp: now + 3600,
        };

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .context("invalid service-account private key")
            .map_err(AppError::Internal)?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .context("failed to sign token assertion")
            .map_err(AppError::Internal)?;

        debug!(email = %key.client_email, "Exchanging service-account assertion");

        let response = self
            .http
            .post(&key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamError(format!(
                "Token exchange failed {}: {}",
                status, text
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok((token.access_token, token.expires_in))
    }

    /// Fetch a token for the default service account from the metadata server
    async fn fetch_metadata_token(&self, base_url: &str) -> AppResult<(String, u64)> {
        let url = format!(
            "{}/computeMetadata/v1/instance/service-accounts/default/token",
            base_url
        );
        let response = self
            .http
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::UpstreamError(format!(
                "Metadata token request failed: {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok((token.access_token, token.expires_in))
    }
}
