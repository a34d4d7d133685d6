// src/auth.rs
// App Store Connect authenticates with a short-lived ES256 bearer token.
// The pipeline only cares that something can produce one, so the signing
// details sit behind a small trait.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

use crate::config::Config;
use crate::error::ApiError;

/// Connect tokens are rejected past 20 minutes; stay inside that window.
const TOKEN_DURATION_SECS: i64 = 20 * 60;
const AUDIENCE: &str = "appstoreconnect-v1";

pub trait TokenProvider: Send + Sync {
    /// Produce a bearer credential valid for the next request.
    fn bearer_token(&self) -> Result<String, ApiError>;
}

#[derive(Debug, Serialize)]
struct Claims {
    iss: String,
    exp: i64,
    aud: &'static str,
}

/// Signs ES256 tokens from the `KEY_ID` / `ISSUER_ID` / `PRIVATE_KEY`
/// credentials. Credentials may be absent at startup; the error surfaces on
/// first use, as an [`ApiError`], not a configuration failure.
pub struct AppStoreTokenService {
    key_id: Option<String>,
    issuer_id: Option<String>,
    private_key: Option<String>,
}

impl AppStoreTokenService {
    pub fn new(key_id: Option<String>, issuer_id: Option<String>, private_key: Option<String>) -> Self {
        Self {
            key_id,
            issuer_id,
            private_key,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.key_id.clone(),
            config.issuer_id.clone(),
            config.private_key.clone(),
        )
    }
}

impl TokenProvider for AppStoreTokenService {
    fn bearer_token(&self) -> Result<String, ApiError> {
        let (key_id, issuer_id, private_key) =
            match (&self.key_id, &self.issuer_id, &self.private_key) {
                (Some(k), Some(i), Some(p)) => (k, i, p),
                _ => return Err(ApiError::MissingCredentials),
            };

        let encoding_key = EncodingKey::from_ec_pem(private_key.as_bytes())
            .map_err(|e| ApiError::Auth(format!("invalid private key: {e}")))?;

        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(key_id.clone());

        let claims = Claims {
            iss: issuer_id.clone(),
            exp: Utc::now().timestamp() + TOKEN_DURATION_SECS,
            aud: AUDIENCE,
        };

        encode(&header, &claims, &encoding_key).map_err(|e| ApiError::Auth(e.to_string()))
    }
}

/// Fixed-token provider for tests and tooling.
pub struct StaticTokenProvider(pub String);

impl TokenProvider for StaticTokenProvider {
    fn bearer_token(&self) -> Result<String, ApiError> {
        Ok(self.0.clone())
    }
}
