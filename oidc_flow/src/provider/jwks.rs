use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::jwk::JwkSet;
use tokio::sync::Mutex;

use super::errors::ProviderError;

const CACHE_EXPIRATION_SECS: i64 = 600;

struct CachedKeys {
    keys: JwkSet,
    expires_at: DateTime<Utc>,
}

/// Provider signing keys, fetched from the JWKS endpoint and kept for ten minutes.
pub(super) struct JwksCache {
    url: String,
    cached: Mutex<Option<CachedKeys>>,
}

impl JwksCache {
    pub(super) fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cached: Mutex::new(None),
        }
    }

    pub(super) async fn get(&self, http: &reqwest::Client) -> Result<JwkSet, ProviderError> {
        let mut cached = self.cached.lock().await;

        if let Some(entry) = cached.as_ref() {
            if entry.expires_at > Utc::now() {
                tracing::debug!("Returning valid cached JWKs");
                return Ok(entry.keys.clone());
            }
            tracing::debug!("Cached JWKs expired");
        }

        let keys = self.fetch(http).await?;
        *cached = Some(CachedKeys {
            keys: keys.clone(),
            expires_at: Utc::now() + Duration::seconds(CACHE_EXPIRATION_SECS),
        });
        Ok(keys)
    }

    /// Drop the cached keys and fetch them again, for a provider that rotated its keys.
    pub(super) async fn refresh(&self, http: &reqwest::Client) -> Result<JwkSet, ProviderError> {
        self.cached.lock().await.take();
        self.get(http).await
    }

    async fn fetch(&self, http: &reqwest::Client) -> Result<JwkSet, ProviderError> {
        let response = http
            .get(self.url.as_str())
            .send()
            .await
            .map_err(|e| ProviderError::Jwks(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Jwks(format!("JWKS endpoint returned {status}")));
        }

        let keys: JwkSet = response
            .json()
            .await
            .map_err(|e| ProviderError::Jwks(format!("Invalid JWKS: {e}")))?;

        tracing::debug!("JWKs fetched from URL: {} keys", keys.keys.len());
        Ok(keys)
    }
}
