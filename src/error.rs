// src/error.rs
// Error taxonomy for the review pipeline. Configuration problems are fatal
// before any network call; fetch problems abort a run; store and delivery
// problems are surfaced but do not by themselves abort delivery.

use std::path::PathBuf;

use thiserror::Error;

/// Bad or missing settings, detected before any network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration keys: {0}")]
    MissingKeys(String),

    #[error("configuration values cannot be empty: {0}")]
    EmptyValues(String),

    #[error("invalid APP_ID format - must be numeric")]
    InvalidAppId,

    #[error("invalid SLACK_WEBHOOK format - must be a valid Slack webhook URL")]
    InvalidWebhook,

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Review source failures. The fetch either fails as a whole or every
/// returned review is well-formed; there are no partial results.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid app id {0:?}: must be a non-empty numeric string")]
    InvalidAppId(String),

    #[error("lookback window must be non-negative")]
    NegativeLookback,

    #[error("missing required API credentials")]
    MissingCredentials,

    #[error("failed to produce API bearer token: {0}")]
    Auth(String),

    #[error("review request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("review request returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid response format from App Store Connect API: {0}")]
    MalformedResponse(String),
}

/// Seen-set persistence failures. Surfaced to the caller because losing the
/// ability to record "already delivered" risks duplicate notifications.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize seen set: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write seen set to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single webhook delivery failure. Never aborts the remaining deliveries.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("webhook returned {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Failures that turn a whole run into a non-zero exit.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Fetch(#[from] ApiError),

    #[error("all {0} review deliveries failed")]
    AllDeliveriesFailed(usize),
}
