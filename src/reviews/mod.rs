// src/reviews/mod.rs
pub mod source;
pub mod store;
pub mod types;

use chrono::{Duration, Utc};

use crate::error::StoreError;
use crate::reviews::store::{SeenSet, SeenSetStore};
use crate::reviews::types::{Review, ReviewSource};

/// What one pipeline pass produced. A failed save still yields the new
/// reviews so the caller can deliver them (at-least-once beats silently
/// dropping a real review); the error rides along for the caller to report.
#[derive(Debug)]
pub struct ProcessOutcome {
    pub new_reviews: Vec<Review>,
    pub store_error: Option<StoreError>,
}

impl ProcessOutcome {
    fn empty() -> Self {
        Self {
            new_reviews: Vec::new(),
            store_error: None,
        }
    }
}

/// Keep the reviews whose id is not in the seen set, in fetch order.
/// Returns the kept reviews and how many were dropped as already seen.
pub fn partition_new(seen: &SeenSet, fetched: Vec<Review>) -> (Vec<Review>, usize) {
    let total = fetched.len();
    let new: Vec<Review> = fetched
        .into_iter()
        .filter(|r| !seen.contains(&r.id))
        .collect();
    let dropped = total - new.len();
    (new, dropped)
}

/// Fetch, dedupe against the persisted seen set, persist, and return the
/// newly-seen reviews (newest first, as fetched).
///
/// Fetch failures propagate unchanged; nothing is deduplicated or persisted
/// on a failed fetch. An empty fetch touches the store not at all.
pub async fn process(
    source: &dyn ReviewSource,
    store: &SeenSetStore,
    app_id: &str,
    lookback: Duration,
) -> Result<ProcessOutcome, crate::error::ApiError> {
    let fetched = source.fetch(app_id, lookback).await?;
    if fetched.is_empty() {
        tracing::info!("no reviews found in the lookback window");
        return Ok(ProcessOutcome::empty());
    }

    let mut seen = store.load();
    tracing::debug!(fetched = fetched.len(), seen = seen.len(), "checking for new reviews");

    let (new_reviews, already_seen) = partition_new(&seen, fetched);
    if new_reviews.is_empty() {
        tracing::info!(already_seen, "no new reviews to process");
        return Ok(ProcessOutcome::empty());
    }

    for review in &new_reviews {
        seen.insert(review.id.clone());
    }
    seen.last_run = Some(Utc::now());

    let store_error = store.save(&seen).err();
    if let Some(e) = &store_error {
        tracing::error!(error = %e, "failed to persist seen set; duplicates possible on next run");
    }

    tracing::info!(new = new_reviews.len(), already_seen, "found new reviews");
    Ok(ProcessOutcome {
        new_reviews,
        store_error,
    })
}
