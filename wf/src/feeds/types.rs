//! Feed aggregation result types

use serde::Serialize;

/// One post parsed from a source feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostRecord {
    pub id: String,
    pub title: String,
    pub note_url: String,
    /// Proxied cover image URL, empty when the post has none
    pub cover_image: String,
    /// Raw body, kept for keyword matching only
    #[serde(skip_serializing)]
    pub description: String,
    pub author: String,
    pub author_tags: Vec<String>,
    pub liked_count: u64,
    /// `YYYY-MM-DD` when the feed carried a parseable date
    pub published: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationStatus {
    Success,
    Fallback,
}

/// Answer to a preview search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationResult {
    pub status: AggregationStatus,
    pub data: Vec<PostRecord>,
    pub search_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AggregationResult {
    pub fn success(data: Vec<PostRecord>, search_url: String) -> Self {
        Self {
            status: AggregationStatus::Success,
            data,
            search_url,
            message: None,
        }
    }

    pub fn fallback(search_url: String, message: impl Into<String>) -> Self {
        Self {
            status: AggregationStatus::Fallback,
            data: Vec::new(),
            search_url,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == AggregationStatus::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Error,
}

/// Health probe outcome for one endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointHealth {
    /// Endpoint as configured
    pub endpoint: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
