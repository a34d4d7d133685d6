// src/notify/mod.rs
pub mod slack;

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::reviews::types::Review;

/// Slack rejects messages past this many characters.
pub const MESSAGE_LIMIT: usize = 4000;
const TRUNCATION_MARKER: &str = "...";

#[async_trait]
pub trait ReviewNotifier: Send + Sync {
    /// Deliver one review. No internal retry; the caller owns the policy for
    /// what happens to the rest of the batch.
    async fn notify_review(&self, review: &Review) -> Result<(), NotifyError>;

    /// Deliver a plain status message ("no new reviews" heartbeat).
    async fn notify_status(&self, text: &str) -> Result<(), NotifyError>;

    /// Deliver a batch, one call per review, stopping at the first failure.
    /// Earlier successes are already delivered and are never re-sent. An
    /// empty batch is a no-op with no network call.
    async fn notify(&self, reviews: &[Review]) -> Result<(), NotifyError> {
        for review in reviews {
            self.notify_review(review).await?;
        }
        Ok(())
    }
}

fn render_with_body(review: &Review, body: &str) -> String {
    format!(
        "*New App Store Review*\n\
         Rating: {}\n\
         Title: {}\n\
         Review: {}\n\
         Reviewer: {}\n\
         Territory: {}\n\
         Date: {}",
        "⭐".repeat(review.rating as usize),
        review.title,
        body,
        review.author,
        review.territory,
        review.created_at.to_rfc3339(),
    )
}

/// Render one review as a single message. An overlong body is truncated with
/// a trailing marker rather than split across messages.
pub fn render_review(review: &Review) -> String {
    let full = render_with_body(review, &review.body);
    if full.chars().count() <= MESSAGE_LIMIT {
        return full;
    }

    let overhead = render_with_body(review, "").chars().count();
    let budget = MESSAGE_LIMIT.saturating_sub(overhead + TRUNCATION_MARKER.len());
    let truncated: String = review.body.chars().take(budget).collect();
    render_with_body(review, &format!("{truncated}{TRUNCATION_MARKER}"))
}
