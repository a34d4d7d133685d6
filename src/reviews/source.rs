// src/reviews/source.rs
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::auth::TokenProvider;
use crate::error::ApiError;
use crate::reviews::types::{Review, ReviewSource};

const DEFAULT_BASE_URL: &str = "https://api.appstoreconnect.apple.com";
const REVIEW_FIELDS: &str = "rating,title,body,reviewerNickname,territory,createdDate";

/// One page only. The source caps at 100 reviews per call and this client
/// deliberately does not paginate further (known limitation, carried forward).
const PAGE_LIMIT: &str = "100";

#[derive(Debug, Deserialize)]
struct ReviewsResponse {
    data: Vec<ReviewRecord>,
}

#[derive(Debug, Deserialize)]
struct ReviewRecord {
    id: String,
    #[serde(default)]
    attributes: ReviewAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct ReviewAttributes {
    rating: Option<u8>,
    title: Option<String>,
    body: Option<String>,
    #[serde(rename = "reviewerNickname")]
    reviewer_nickname: Option<String>,
    territory: Option<String>,
    #[serde(rename = "createdDate")]
    created_date: Option<String>,
}

/// Fill in the defaults the source leaves blank. A record with a missing or
/// unparsable `createdDate` is dropped on its own; the rest of the fetch
/// is unaffected.
fn normalize_record(record: ReviewRecord) -> Option<Review> {
    let attrs = record.attributes;
    let created_at = attrs
        .created_date
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())?
        .with_timezone(&Utc);

    Some(Review {
        id: record.id,
        rating: attrs.rating.unwrap_or(0),
        title: attrs.title.unwrap_or_else(|| "No title".to_string()),
        body: attrs.body.unwrap_or_else(|| "No review text".to_string()),
        author: attrs
            .reviewer_nickname
            .unwrap_or_else(|| "Anonymous".to_string()),
        territory: attrs.territory.unwrap_or_else(|| "Unknown".to_string()),
        created_at,
    })
}

/// Keep only reviews created inside `[start, end]`. The source is asked for a
/// date-bounded page but is not trusted to honor it.
fn filter_window(reviews: Vec<Review>, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Review> {
    reviews
        .into_iter()
        .filter(|r| r.created_at >= start && r.created_at <= end)
        .collect()
}

fn validate_request(app_id: &str, lookback: Duration) -> Result<(), ApiError> {
    if app_id.is_empty() || !app_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::InvalidAppId(app_id.to_string()));
    }
    if lookback < Duration::zero() {
        return Err(ApiError::NegativeLookback);
    }
    Ok(())
}

pub struct AppStoreClient {
    base_url: String,
    client: reqwest::Client,
    timeout: std::time::Duration,
    tokens: Box<dyn TokenProvider>,
}

impl AppStoreClient {
    pub fn new(tokens: Box<dyn TokenProvider>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
            timeout: std::time::Duration::from_secs(30),
            tokens,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = std::time::Duration::from_secs(secs);
        self
    }
}

#[async_trait]
impl ReviewSource for AppStoreClient {
    async fn fetch(&self, app_id: &str, lookback: Duration) -> Result<Vec<Review>, ApiError> {
        validate_request(app_id, lookback)?;

        let end = Utc::now();
        let start = end - lookback;
        let token = self.tokens.bearer_token()?;

        tracing::info!(
            app_id,
            start = %start.format("%Y-%m-%d"),
            end = %end.format("%Y-%m-%d"),
            "fetching reviews"
        );

        let url = format!("{}/v1/apps/{}/customerReviews", self.base_url, app_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("fields[customerReviews]", REVIEW_FIELDS),
                ("sort", "-createdDate"),
                ("limit", PAGE_LIMIT),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status { status, body });
        }

        let parsed: ReviewsResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        let reviews: Vec<Review> = parsed
            .data
            .into_iter()
            .filter_map(normalize_record)
            .collect();
        let kept = filter_window(reviews, start, end);

        tracing::info!(count = kept.len(), "fetched reviews");
        Ok(kept)
    }

    fn name(&self) -> &'static str {
        "AppStoreConnect"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: serde_json::Value) -> ReviewRecord {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn normalize_fills_defaults() {
        let r = record(serde_json::json!({
            "id": "rev-1",
            "attributes": { "createdDate": "2024-03-01T12:00:00Z" }
        }));
        let review = normalize_record(r).unwrap();
        assert_eq!(review.rating, 0);
        assert_eq!(review.title, "No title");
        assert_eq!(review.body, "No review text");
        assert_eq!(review.author, "Anonymous");
        assert_eq!(review.territory, "Unknown");
    }

    #[test]
    fn normalize_keeps_provided_fields() {
        let r = record(serde_json::json!({
            "id": "rev-2",
            "attributes": {
                "rating": 5,
                "title": "Great app!",
                "body": "Works well.",
                "reviewerNickname": "TestUser1",
                "territory": "USA",
                "createdDate": "2024-03-01T12:00:00+00:00"
            }
        }));
        let review = normalize_record(r).unwrap();
        assert_eq!(review.rating, 5);
        assert_eq!(review.title, "Great app!");
        assert_eq!(review.author, "TestUser1");
        assert_eq!(review.territory, "USA");
    }

    #[test]
    fn bad_date_drops_only_that_record() {
        let good = record(serde_json::json!({
            "id": "a", "attributes": { "createdDate": "2024-03-01T12:00:00Z" }
        }));
        let bad = record(serde_json::json!({
            "id": "b", "attributes": { "createdDate": "yesterday-ish" }
        }));
        let missing = record(serde_json::json!({ "id": "c", "attributes": {} }));

        let kept: Vec<_> = [good, bad, missing]
            .into_iter()
            .filter_map(normalize_record)
            .collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "a");
    }

    #[test]
    fn window_filter_is_inclusive_and_drops_outsiders() {
        let end = Utc::now();
        let start = end - Duration::days(1);
        let mk = |id: &str, at: DateTime<Utc>| Review {
            id: id.into(),
            rating: 3,
            title: "t".into(),
            body: "b".into(),
            author: "a".into(),
            territory: "US".into(),
            created_at: at,
        };
        let reviews = vec![
            mk("in-window", end - Duration::hours(2)),
            mk("at-start", start),
            mk("too-old", start - Duration::seconds(1)),
        ];
        let kept = filter_window(reviews, start, end);
        let ids: Vec<_> = kept.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["in-window", "at-start"]);
    }

    #[test]
    fn app_id_must_be_numeric_and_nonempty() {
        assert!(validate_request("123456", Duration::days(1)).is_ok());
        assert!(matches!(
            validate_request("", Duration::days(1)),
            Err(ApiError::InvalidAppId(_))
        ));
        assert!(matches!(
            validate_request("abc123", Duration::days(1)),
            Err(ApiError::InvalidAppId(_))
        ));
    }

    #[test]
    fn lookback_must_be_non_negative() {
        assert!(validate_request("1", Duration::zero()).is_ok());
        assert!(matches!(
            validate_request("1", Duration::days(-1)),
            Err(ApiError::NegativeLookback)
        ));
    }
}
