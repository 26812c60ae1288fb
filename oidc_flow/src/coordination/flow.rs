use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::OIDC_EXCHANGE_TIMEOUT;
use crate::provider::OidcProvider;
use crate::session::SessionIssuer;

use super::errors::FlowError;

/// Entry point for the login and callback operations.
///
/// The provider is optional: a deployment without OIDC configured is a normal
/// state, and every operation checks for it before doing anything else.
#[derive(Clone)]
pub struct OidcFlow {
    provider: Option<Arc<dyn OidcProvider>>,
    pub(super) sessions: Arc<dyn SessionIssuer>,
    pub(super) exchange_timeout: Duration,
}

impl OidcFlow {
    pub fn new(
        provider: Option<Arc<dyn OidcProvider>>,
        sessions: Arc<dyn SessionIssuer>,
    ) -> Self {
        Self {
            provider,
            sessions,
            exchange_timeout: *OIDC_EXCHANGE_TIMEOUT,
        }
    }

    /// Override the deadline applied to each code exchange.
    pub fn with_exchange_timeout(mut self, timeout: Duration) -> Self {
        self.exchange_timeout = timeout;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    pub(super) fn provider(&self) -> Result<&dyn OidcProvider, FlowError> {
        self.provider
            .as_deref()
            .ok_or_else(|| FlowError::NotConfigured.log())
    }
}

impl fmt::Debug for OidcFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OidcFlow")
            .field("enabled", &self.is_enabled())
            .field("exchange_timeout", &self.exchange_timeout)
            .finish()
    }
}
