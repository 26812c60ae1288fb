use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use http::header::{COOKIE, HeaderMap};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::coordination::UserId;
use crate::utils::{gen_random_string, header_set_cookie};

use super::SessionIssuer;
use super::config::{SESSION_COOKIE_MAX_AGE, SESSION_COOKIE_NAME};
use super::errors::SessionError;

#[derive(Debug, Clone)]
struct StoredSession {
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

/// Process-local session store keyed by a random session id carried in a cookie.
///
/// Clones share the same underlying map.
#[derive(Clone)]
pub struct InMemorySessionStore {
    entries: Arc<Mutex<HashMap<String, StoredSession>>>,
    cookie_name: String,
    max_age: u64,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionStore {
    /// Create a store using `SESSION_COOKIE_NAME` and `SESSION_COOKIE_MAX_AGE`.
    pub fn new() -> Self {
        Self::with_cookie(SESSION_COOKIE_NAME.as_str(), *SESSION_COOKIE_MAX_AGE)
    }

    pub fn with_cookie(cookie_name: impl Into<String>, max_age: u64) -> Self {
        tracing::info!("Creating new in-memory session store");
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            cookie_name: cookie_name.into(),
            max_age,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Look up the user owning the session cookie in `headers`, if it is still valid.
    pub async fn user_id_from_headers(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<UserId>, SessionError> {
        let Some(session_id) = self.session_id_from_headers(headers)? else {
            return Ok(None);
        };

        let mut entries = self.entries.lock().await;
        let Some(session) = entries.get(session_id).cloned() else {
            return Ok(None);
        };

        if session.expires_at <= Utc::now() {
            tracing::debug!("Session expired at {}", session.expires_at);
            entries.remove(session_id);
            return Ok(None);
        }

        Ok(Some(session.user_id))
    }

    /// Drop the session referenced by `headers` and return headers expiring its cookie.
    pub async fn remove_session(&self, headers: &HeaderMap) -> Result<HeaderMap, SessionError> {
        if let Some(session_id) = self.session_id_from_headers(headers)? {
            self.entries.lock().await.remove(session_id);
        }

        let mut headers = HeaderMap::new();
        header_set_cookie(&mut headers, &self.cookie_name, "value", -86400)?;
        Ok(headers)
    }

    fn session_id_from_headers<'a>(
        &self,
        headers: &'a HeaderMap,
    ) -> Result<Option<&'a str>, SessionError> {
        for cookie_header in headers.get_all(COOKIE) {
            let cookie_str = cookie_header.to_str().map_err(|e| {
                tracing::error!("Invalid cookie header: {}", e);
                SessionError::HeaderError("Invalid cookie header".to_string())
            })?;

            let session_id = cookie_str.split(';').map(|s| s.trim()).find_map(|s| {
                match s.split_once('=') {
                    Some((k, v)) if k == self.cookie_name => Some(v),
                    _ => None,
                }
            });

            if session_id.is_some() {
                return Ok(session_id);
            }
        }

        tracing::debug!("No session cookie '{}' found in cookies", self.cookie_name);
        Ok(None)
    }
}

#[async_trait]
impl SessionIssuer for InMemorySessionStore {
    async fn create_session(&self, user_id: &UserId) -> Result<HeaderMap, SessionError> {
        let max_age = i64::try_from(self.max_age)
            .map_err(|_| SessionError::Storage("Session max age out of range".to_string()))?;
        let now = Utc::now();
        let expires_at = Duration::try_seconds(max_age)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| SessionError::Storage("Session max age out of range".to_string()))?;

        let session_id = gen_random_string(32)?;

        {
            let mut entries = self.entries.lock().await;
            entries.retain(|_, session| session.expires_at > now);
            entries.insert(
                session_id.clone(),
                StoredSession {
                    user_id: user_id.clone(),
                    expires_at,
                },
            );
        }

        let mut headers = HeaderMap::new();
        header_set_cookie(&mut headers, &self.cookie_name, &session_id, max_age)?;

        tracing::debug!(user = %user_id, "Session created");
        Ok(headers)
    }
}
