//! HTTP access to feed endpoints

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

/// Longest slice of an error response body kept for logging
const BODY_PREVIEW_CHARS: usize = 200;

/// A single source fetch that did not produce a feed body
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}

/// Feed endpoint access
///
/// Timeouts are applied by the caller around each call.
#[async_trait]
pub trait FeedTransport: Send + Sync {
    /// GET `url` and return the body of a 2xx response
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;

    /// GET `url` and return the status code, whatever it is
    async fn probe(&self, url: &str) -> Result<u16, FetchError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, FetchError> {
        debug!("HttpTransport::new: called");
        // Feed endpoints are often on localhost; never route them through a system proxy
        let http = Client::builder().no_proxy().build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl FeedTransport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!(%url, "HttpTransport::fetch: called");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(%url, status = status.as_u16(), "HttpTransport::fetch: non-success status");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: body.chars().take(BODY_PREVIEW_CHARS).collect(),
            });
        }
        Ok(body)
    }

    async fn probe(&self, url: &str) -> Result<u16, FetchError> {
        debug!(%url, "HttpTransport::probe: called");
        let response = self.http.get(url).send().await?;
        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Scripted answer for one URL
    #[derive(Debug, Clone)]
    pub enum Scripted {
        Body(String),
        Status(u16),
        Fail(String),
        Hang,
    }

    /// Transport answering from a URL table; unknown URLs fail
    pub struct MockTransport {
        routes: HashMap<String, Scripted>,
        requests: Mutex<Vec<(String, Instant)>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                routes: HashMap::new(),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn route(mut self, url: &str, answer: Scripted) -> Self {
            self.routes.insert(url.to_string(), answer);
            self
        }

        /// Requested URLs with their start instants, in arrival order
        pub fn requests(&self) -> Vec<(String, Instant)> {
            self.requests.lock().map(|r| r.clone()).unwrap_or_default()
        }

        pub fn requested_urls(&self) -> Vec<String> {
            self.requests().into_iter().map(|(url, _)| url).collect()
        }

        async fn answer(&self, url: &str) -> Scripted {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push((url.to_string(), Instant::now()));
            }
            let answer = self
                .routes
                .get(url)
                .cloned()
                .unwrap_or_else(|| Scripted::Fail(format!("connection refused: {}", url)));
            if let Scripted::Hang = answer {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
            }
            answer
        }
    }

    #[async_trait]
    impl FeedTransport for MockTransport {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            match self.answer(url).await {
                Scripted::Body(body) => Ok(body),
                Scripted::Status(status) => Err(FetchError::Status {
                    status,
                    body: String::new(),
                }),
                Scripted::Fail(message) => Err(FetchError::Transport(message)),
                Scripted::Hang => Err(FetchError::Transport("hang elapsed".to_string())),
            }
        }

        async fn probe(&self, url: &str) -> Result<u16, FetchError> {
            match self.answer(url).await {
                Scripted::Body(_) => Ok(200),
                Scripted::Status(status) => Ok(status),
                Scripted::Fail(message) => Err(FetchError::Transport(message)),
                Scripted::Hang => Err(FetchError::Transport("hang elapsed".to_string())),
            }
        }
    }
}
