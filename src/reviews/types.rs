// src/reviews/types.rs
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::ApiError;

/// One customer review, normalized from whatever shape the source returned.
/// Two records with the same `id` are the same review; content drift under a
/// stable id is not detected.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Review {
    pub id: String,
    pub rating: u8, // 0..=5
    pub title: String,
    pub body: String,
    pub author: String,
    pub territory: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Fetch reviews for `app_id` created within `[now - lookback, now]`,
    /// newest first. Fails as a whole on any source problem.
    async fn fetch(&self, app_id: &str, lookback: Duration) -> Result<Vec<Review>, ApiError>;

    fn name(&self) -> &'static str;
}
