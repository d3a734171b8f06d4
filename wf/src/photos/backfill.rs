//! Image backfill for finished trip plans

use futures::StreamExt;
use futures::stream;
use tracing::{debug, warn};

use super::PhotoFinder;
use crate::plan::TripPlan;

/// Fills `image_urls` for attractions that have none
///
/// Best-effort: a failed lookup leaves the attraction without images.
pub struct ImageBackfill {
    finder: PhotoFinder,
    per_attraction: usize,
    concurrency: usize,
}

impl ImageBackfill {
    pub fn new(finder: PhotoFinder, per_attraction: usize, concurrency: usize) -> Self {
        debug!(per_attraction, concurrency, "ImageBackfill::new: called");
        Self {
            finder,
            per_attraction,
            concurrency: concurrency.max(1),
        }
    }

    /// Look up images for every attraction missing them; returns how many were filled
    pub async fn apply(&self, plan: &mut TripPlan) -> usize {
        let targets: Vec<(usize, usize, String)> = plan
            .days
            .iter()
            .enumerate()
            .flat_map(|(d, day)| {
                day.attractions
                    .iter()
                    .enumerate()
                    .filter(|(_, a)| a.image_urls.is_empty())
                    .map(move |(a, attraction)| (d, a, attraction.name.clone()))
            })
            .collect();
        debug!(missing = targets.len(), "apply: called");

        let city = plan.city.clone();
        let found: Vec<(usize, usize, Vec<String>)> = stream::iter(targets)
            .map(|(d, a, name)| {
                let query = format!("{} {}", name, city);
                let city = city.as_str();
                async move {
                    match self.finder.find(&query, city, self.per_attraction).await {
                        Ok(urls) => (d, a, urls),
                        Err(e) => {
                            warn!(%query, error = %e, "apply: photo lookup failed");
                            (d, a, Vec::new())
                        }
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut filled = 0;
        for (d, a, urls) in found {
            if urls.is_empty() {
                continue;
            }
            if let Some(attraction) = plan.days.get_mut(d).and_then(|day| day.attractions.get_mut(a)) {
                attraction.image_urls = urls.into_iter().take(self.per_attraction).collect();
                filled += 1;
            }
        }
        filled
    }
}
