//! Travel post previews from blogger feeds
//!
//! Searches a fixed registry of blogger feeds, served by one or more
//! RSSHub-style endpoints, for posts matching a keyword.

mod aggregator;
pub mod parser;
pub mod registry;
mod transport;
mod types;

pub use aggregator::{Aggregator, build_search_url, filter_by_keyword, fix_localhost_url};
pub use parser::FeedParser;
pub use registry::{SourceEntry, sources};
pub use transport::{FeedTransport, FetchError, HttpTransport};
pub use types::{AggregationResult, AggregationStatus, EndpointHealth, HealthStatus, PostRecord};
