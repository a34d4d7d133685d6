// src/notify/slack.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{render_review, ReviewNotifier};
use crate::error::NotifyError;
use crate::reviews::types::Review;

/// Posts one message per review to a Slack incoming webhook. Any 2xx is
/// success; everything else fails that single call, without retry.
pub struct SlackNotifier {
    webhook_url: String,
    channel: String,
    client: Client,
    timeout: Duration,
}

impl SlackNotifier {
    pub fn new(webhook_url: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            channel: channel.into(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    async fn post(&self, text: &str) -> Result<(), NotifyError> {
        let body = serde_json::json!({ "text": text, "channel": self.channel });
        let response = self
            .client
            .post(&self.webhook_url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }
        Ok(())
    }
}

#[async_trait]
impl ReviewNotifier for SlackNotifier {
    async fn notify_review(&self, review: &Review) -> Result<(), NotifyError> {
        self.post(&render_review(review)).await?;
        tracing::info!(review_id = %review.id, rating = review.rating, "sent review notification");
        Ok(())
    }

    async fn notify_status(&self, text: &str) -> Result<(), NotifyError> {
        self.post(text).await
    }
}
