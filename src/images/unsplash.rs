//! Unsplash image search for tourism content
//!
//! Search queries are enriched with Malaysia tourism context before hitting
//! the Unsplash API. When no access key is configured, or the API fails,
//! a small curated set of Malaysia images is returned instead.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AppResult;

/// One search result with the attribution Unsplash requires
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageResult {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photographer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photographer_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    urls: ItemUrls,
    #[serde(default)]
    alt_description: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    user: Option<ItemUser>,
    #[serde(default)]
    links: Option<ItemLinks>,
}

#[derive(Debug, Deserialize)]
struct ItemUrls {
    regular: String,
}

#[derive(Debug, Deserialize, Default)]
struct ItemUser {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ItemLinks {
    #[serde(default)]
    download_location: Option<String>,
}

/// Unsplash search client
pub struct UnsplashClient {
    client: reqwest::Client,
    base_url: String,
    access_key: Option<String>,
}

impl UnsplashClient {
    pub fn new(client: reqwest::Client, base_url: String, access_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            access_key,
        }
    }

    /// Search for tourism images, falling back to the curated set when the
    /// API is not configured or unavailable.
    pub async fn search(&self, query: &str, max_results: usize) -> Vec<ImageResult> {
        let access_key = match &self.access_key {
            Some(key) => key.clone(),
            None => {
                warn!("No Unsplash access key configured, using curated fallback images");
                return curated_images(query);
            }
        };

        let enhanced = enhance_query(query);
        match self.search_api(&access_key, &enhanced, max_results).await {
            Ok(images) => {
                info!(count = images.len(), query = %query, "Retrieved Unsplash images");
                images
            }
            Err(e) => {
                warn!(error = %e, query = %query, "Unsplash search failed, using curated fallback");
                curated_images(query)
            }
        }
    }

    async fn search_api(
        &self,
        access_key: &str,
        query: &str,
        max_results: usize,
    ) -> AppResult<Vec<ImageResult>> {
        let response = self
            .client
            .get(format!("{}/search/photos", self.base_url))
            .header("Authorization", format!("Client-ID {}", access_key))
            .query(&[
                ("query", query),
                ("per_page", &max_results.to_string()),
                ("orientation", "landscape"),
                ("content_filter", "high"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(crate::error::AppError::UpstreamError(format!(
                "Unsplash API error: {}",
                response.status()
            )));
        }

        let body: SearchResponse = response.json().await?;
        let images = body
            .results
            .into_iter()
            .map(|item| {
                let user = item.user.unwrap_or_default();
                let photographer_url = user
                    .username
                    .as_deref()
                    .filter(|u| !u.is_empty())
                    .map(|u| format!("https://unsplash.com/@{}", u))
                    .unwrap_or_else(|| "https://unsplash.com".to_string());

                ImageResult {
                    url: item.urls.regular,
                    title: item
                        .alt_description
                        .or_else(|| Some("Malaysia Tourism".to_string())),
                    description: item.description,
                    source: Some("Unsplash".to_string()),
                    photographer_name: Some(
                        user.name.unwrap_or_else(|| "Unknown Photographer".to_string()),
                    ),
                    photographer_url: Some(photographer_url),
                    download_url: item.links.and_then(|l| l.download_location),
                }
            })
            .collect();

        Ok(images)
    }

    /// Trigger Unsplash download tracking, required for production API access.
    /// Returns false rather than erroring; tracking must never fail a request.
    pub async fn track_download(&self, download_url: &str) -> bool {
        let access_key = match &self.access_key {
            Some(key) => key,
            None => {
                warn!("No Unsplash access key configured for download tracking");
                return false;
            }
        };

        match self
            .client
            .get(download_url)
            .header("Authorization", format!("Client-ID {}", access_key))
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(status = %response.status(), "Download tracking failed");
                false
            }
            Err(e) => {
                warn!(error = %e, "Download tracking error");
                false
            }
        }
    }
}

/// Add Malaysia and tourism context to a search query when missing
pub fn enhance_query(query: &str) -> String {
    let mut query = query.to_lowercase();

    if !query.contains("malaysia") && !query.contains("kuala lumpur") && !query.contains("penang") {
        query = format!("{} Malaysia", query);
    }

    const TOURISM_KEYWORDS: &[&str] = &["tourism", "travel", "destination", "attraction"];
    if !TOURISM_KEYWORDS.iter().any(|k| query.contains(k)) {
        query = format!("{} tourism", query);
    }

    query
}

/// Curated Malaysia images used when the API is unavailable
pub fn curated_images(query: &str) -> Vec<ImageResult> {
    const CURATED: &[(&str, &[&str])] = &[
        (
            "kuala lumpur",
            &[
                "https://images.unsplash.com/photo-1596422846543-75c6fc197f07?auto=format&fit=crop&w=1000&q=80",
                "https://images.unsplash.com/photo-1549055141-4670d75ba8a9?auto=format&fit=crop&w=1000&q=80",
            ],
        ),
        (
            "penang",
            &[
                "https://images.unsplash.com/photo-1570633514586-e0bcc8c062b3?auto=format&fit=crop&w=1000&q=80",
                "https://images.unsplash.com/photo-1572279863518-9ede28527d93?auto=format&fit=crop&w=1000&q=80",
            ],
        ),
        (
            "malaysia",
            &[
                "https://images.unsplash.com/photo-1549055141-4670d75ba8a9?auto=format&fit=crop&w=1000&q=80",
                "https://images.unsplash.com/photo-1596422846543-75c6fc197f07?auto=format&fit=crop&w=1000&q=80",
            ],
        ),
    ];

    let query_lower = query.to_lowercase();
    let mut urls: Vec<&str> = Vec::new();
    for (location, location_urls) in CURATED {
        if query_lower.contains(location) {
            urls.extend(location_urls.iter().take(2));
        }
    }
    if urls.is_empty() {
        urls.extend(CURATED[2].1.iter().take(2));
    }

    urls.into_iter()
        .take(3)
        .map(|url| ImageResult {
            url: url.to_string(),
            title: Some(format!("Malaysia Tourism - {}", query)),
            description: Some("Beautiful destination in Malaysia".to_string()),
            source: Some("Curated Collection".to_string()),
            photographer_name: None,
            photographer_url: None,
            download_url: None,
        })
        .collect()
}
