use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::errors::ProviderError;
use super::types::PendingLogin;

const MAX_PENDING_LOGINS: usize = 10_000;

/// Logins that have been started but not yet completed, keyed by `state`.
///
/// At most `capacity` logins are held; when full, the one closest to expiry is dropped.
pub(super) struct PendingLogins {
    entries: Mutex<HashMap<String, PendingLogin>>,
    capacity: usize,
}

impl Default for PendingLogins {
    fn default() -> Self {
        Self::with_capacity(MAX_PENDING_LOGINS)
    }
}

impl PendingLogins {
    pub(super) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub(super) async fn insert(&self, state: String, login: PendingLogin) {
        let now = Utc::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, pending| pending.expires_at > now);

        while entries.len() >= self.capacity {
            let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, pending)| pending.expires_at)
                .map(|(state, _)| state.clone())
            else {
                break;
            };
            tracing::warn!("Too many pending OIDC logins, dropping the oldest");
            entries.remove(&oldest);
        }

        entries.insert(state, login);
    }

    /// Remove and return the login for `state`. A state can be taken once.
    pub(super) async fn take(&self, state: &str) -> Result<PendingLogin, ProviderError> {
        let login = self
            .entries
            .lock()
            .await
            .remove(state)
            .ok_or(ProviderError::UnknownState)?;

        if login.expires_at <= Utc::now() {
            tracing::debug!("Pending login expired at {}", login.expires_at);
            return Err(ProviderError::StateExpired);
        }

        Ok(login)
    }

    #[cfg(test)]
    pub(super) async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
