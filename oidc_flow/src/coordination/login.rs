use crate::redirect::{RequestTransport, resolve_callback_address};

use super::errors::FlowError;
use super::flow::OidcFlow;
use super::types::AuthorizationRequest;

impl OidcFlow {
    /// Start a login by asking the provider for an authorization URL bound to
    /// this request's callback address.
    ///
    /// The URL is returned as data; whether to redirect is left to the caller.
    pub async fn start_login(
        &self,
        transport: &RequestTransport,
    ) -> Result<AuthorizationRequest, FlowError> {
        let provider = self.provider()?;

        let callback = resolve_callback_address(transport);
        tracing::debug!(callback = %callback, "Starting OIDC login");

        let auth_url = provider
            .authorization_url(&callback)
            .await
            .map_err(|e| FlowError::UpstreamError(e).log())?;

        Ok(AuthorizationRequest { auth_url })
    }
}
