//! Unsplash photo search client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{PhotoError, PhotoSearch};
use crate::config::PhotosConfig;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: Option<String>,
}

/// Unsplash `search/photos` client
pub struct UnsplashClient {
    http: Client,
    base_url: String,
    access_key: String,
}

impl UnsplashClient {
    /// Create a client from configuration
    ///
    /// The access key is read from the environment variable named in the config.
    pub fn from_config(config: &PhotosConfig) -> Result<Self, PhotoError> {
        debug!(base_url = %config.base_url, "UnsplashClient::from_config: called");
        let access_key = config
            .access_key()
            .ok_or_else(|| PhotoError::MissingAccessKey(config.access_key_env.clone()))?;

        let http = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_key,
        })
    }
}

/// Pull the regular-size URLs out of a search response
fn parse_results(body: SearchResponse) -> Vec<String> {
    body.results.into_iter().filter_map(|r| r.urls.regular).collect()
}

#[async_trait]
impl PhotoSearch for UnsplashClient {
    async fn search(&self, query: &str, per_page: usize) -> Result<Vec<String>, PhotoError> {
        debug!(%query, per_page, "UnsplashClient::search: called");
        let url = format!("{}/search/photos", self.base_url);
        let per_page = per_page.to_string();

        let response = self
            .http
            .get(&url)
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("client_id", self.access_key.as_str()),
                ("order_by", "relevant"),
                ("content_filter", "high"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "UnsplashClient::search: non-success status");
            return Err(PhotoError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response.json().await?;
        let urls = parse_results(body);
        debug!(count = urls.len(), "UnsplashClient::search: results parsed");
        Ok(urls)
    }
}
