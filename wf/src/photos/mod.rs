//! Attraction photo lookup
//!
//! [`PhotoSearch`] is the raw image search seam (Unsplash in production).
//! [`PhotoFinder`] layers name translation and fallback queries on top, and
//! [`ImageBackfill`] fills empty `image_urls` across a finished trip plan.

mod backfill;
mod error;
mod finder;
mod unsplash;

use async_trait::async_trait;

pub use backfill::ImageBackfill;
pub use error::PhotoError;
pub use finder::{NameTranslator, PhotoFinder};
pub use unsplash::UnsplashClient;

/// Image search backend
#[async_trait]
pub trait PhotoSearch: Send + Sync {
    /// Return up to `per_page` image URLs for `query`, most relevant first
    async fn search(&self, query: &str, per_page: usize) -> Result<Vec<String>, PhotoError>;
}
