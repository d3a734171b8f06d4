//! Aggregator - searches every registered source across prioritized endpoints
//!
//! Endpoints are tried in order. One pass fetches all sources from a single
//! endpoint, keyword-filters their posts and ranks the matches. The first
//! endpoint with any match wins; when none has one the caller gets a search
//! link instead of unrelated posts.

use std::sync::Arc;

use futures::StreamExt;
use futures::future::join_all;
use futures::stream;
use tracing::{debug, info, warn};

use super::parser::FeedParser;
use super::registry::SourceEntry;
use super::transport::{FeedTransport, FetchError};
use super::{AggregationResult, EndpointHealth, HealthStatus, PostRecord};
use crate::config::FeedsConfig;

const FALLBACK_MESSAGE: &str = "Post previews are temporarily unavailable. Follow the link to search directly.";

/// Multi-endpoint feed search
pub struct Aggregator {
    transport: Arc<dyn FeedTransport>,
    sources: Vec<SourceEntry>,
    parser: FeedParser,
    config: FeedsConfig,
}

impl Aggregator {
    pub fn new(transport: Arc<dyn FeedTransport>, sources: Vec<SourceEntry>, config: FeedsConfig) -> Self {
        debug!(
            sources = sources.len(),
            endpoints = config.endpoints.len(),
            "Aggregator::new: called"
        );
        let parser = FeedParser::new(config.max_entries_per_source, config.image_proxy_base.clone());
        Self {
            transport,
            sources,
            parser,
            config,
        }
    }

    /// Search all sources for `keyword`
    ///
    /// Never fails: exhausting every endpoint yields a fallback result.
    pub async fn search(&self, keyword: &str) -> AggregationResult {
        debug!(%keyword, "search: called");
        let search_url = build_search_url(&self.config.search_url_base, keyword);

        for endpoint in &self.config.endpoints {
            let matches = self.pass(endpoint, keyword).await;
            if !matches.is_empty() {
                info!(%endpoint, matches = matches.len(), "Preview search succeeded");
                return AggregationResult::success(matches, search_url);
            }
            debug!(%endpoint, "search: no matches, trying next endpoint");
        }

        info!(%keyword, "Preview search fell back to search link");
        AggregationResult::fallback(search_url, FALLBACK_MESSAGE)
    }

    /// One aggregation pass against a single endpoint
    async fn pass(&self, endpoint: &str, keyword: &str) -> Vec<PostRecord> {
        let base = fix_localhost_url(endpoint);
        debug!(%endpoint, %base, "pass: called");
        let spacing = self.config.request_spacing();
        let started = tokio::time::Instant::now();

        // Delays are measured from the start of the pass, not from when the
        // pool admits each fetch.
        let per_source: Vec<Option<Vec<PostRecord>>> = stream::iter(self.sources.iter().enumerate())
            .map(|(i, source)| {
                let base = base.as_str();
                async move {
                    if i > 0 {
                        tokio::time::sleep_until(started + spacing * i as u32).await;
                    }
                    self.fetch_source(base, source, keyword).await
                }
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let succeeded = per_source.iter().filter(|r| r.is_some()).count();
        let mut matches: Vec<PostRecord> = per_source.into_iter().flatten().flatten().collect();
        debug!(
            %endpoint,
            succeeded,
            total = self.sources.len(),
            matches = matches.len(),
            "pass: sources fetched"
        );

        matches.sort_by(|a, b| b.liked_count.cmp(&a.liked_count));
        matches.truncate(self.config.max_results);
        matches
    }

    /// Fetch, parse and filter one source; `None` when the fetch failed
    async fn fetch_source(&self, base: &str, source: &SourceEntry, keyword: &str) -> Option<Vec<PostRecord>> {
        let url = format!("{}/{}/{}/notes", base, self.config.route_prefix.trim_matches('/'), source.id);
        let limit = self.config.request_timeout();

        let body = match tokio::time::timeout(limit, self.transport.fetch(&url)).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                warn!(source = %source.name, %url, error = %e, "fetch_source: source skipped");
                return None;
            }
            Err(_) => {
                warn!(source = %source.name, %url, error = %FetchError::Timeout(limit), "fetch_source: source skipped");
                return None;
            }
        };

        let records = self.parser.parse(&body, source.name, &source.tag_list());
        let matched = filter_by_keyword(records, keyword);
        debug!(source = %source.name, matched = matched.len(), "fetch_source: filtered");
        Some(matched)
    }

    /// Probe `<endpoint>/healthz` on every configured endpoint
    pub async fn check_health(&self) -> Vec<EndpointHealth> {
        debug!("check_health: called");
        let limit = self.config.health_timeout();

        let probes = self.config.endpoints.iter().map(|endpoint| async move {
            let url = format!("{}/healthz", fix_localhost_url(endpoint));
            let outcome = match tokio::time::timeout(limit, self.transport.probe(&url)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(limit)),
            };
            debug!(%url, ?outcome, "check_health: probed");

            match outcome {
                Ok(code) => EndpointHealth {
                    endpoint: endpoint.clone(),
                    status: if code == 200 { HealthStatus::Ok } else { HealthStatus::Error },
                    code: Some(code),
                    error: None,
                },
                Err(e) => EndpointHealth {
                    endpoint: endpoint.clone(),
                    status: HealthStatus::Error,
                    code: None,
                    error: Some(e.to_string()),
                },
            }
        });

        join_all(probes).await
    }
}

/// Keep records whose title or body contains any whitespace-separated keyword token
///
/// Matching is case-insensitive. A keyword with no tokens keeps everything.
pub fn filter_by_keyword(records: Vec<PostRecord>, keyword: &str) -> Vec<PostRecord> {
    let tokens: Vec<String> = keyword.split_whitespace().map(str::to_lowercase).collect();
    if tokens.is_empty() {
        return records;
    }

    records
        .into_iter()
        .filter(|r| {
            let title = r.title.to_lowercase();
            let description = r.description.to_lowercase();
            tokens
                .iter()
                .any(|t| title.contains(t.as_str()) || description.contains(t.as_str()))
        })
        .collect()
}

/// Search page link for `keyword`
pub fn build_search_url(base: &str, keyword: &str) -> String {
    format!("{}{}", base, urlencoding::encode(keyword))
}

/// Rewrite `localhost` to `127.0.0.1` so local endpoints resolve over IPv4
pub fn fix_localhost_url(url: &str) -> String {
    url.replace("localhost", "127.0.0.1").trim_end_matches('/').to_string()
}
