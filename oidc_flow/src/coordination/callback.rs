use crate::provider::{OidcProvider, ProviderError};

use super::errors::FlowError;
use super::flow::OidcFlow;
use super::types::{CallbackOutcome, CallbackParameters, UserId};

impl OidcFlow {
    /// Complete a login from the provider's redirect.
    ///
    /// Returns `Err` only when OIDC is not configured. Every other failure is a
    /// [`CallbackOutcome::Failed`], which the web layer turns into the same
    /// generic error redirect; the cause is logged here and never leaves the server.
    ///
    /// Exactly one exchange is attempted. Dropping the returned future (for example
    /// when the client disconnects) abandons the exchange before a session is created.
    pub async fn complete_callback(
        &self,
        params: &CallbackParameters,
    ) -> Result<CallbackOutcome, FlowError> {
        let provider = self.provider()?;

        if let Some(error) = params.error.as_deref() {
            tracing::warn!(
                error,
                description = params.error_description.as_deref().unwrap_or_default(),
                "OIDC provider returned an error"
            );
        }

        if params.state.is_empty() || params.code.is_empty() {
            return Ok(CallbackOutcome::Failed(FlowError::MissingParameters.log()));
        }

        let user_id = match self.exchange(provider, &params.state, &params.code).await {
            Ok(user_id) => user_id,
            Err(err) => return Ok(CallbackOutcome::Failed(FlowError::ExchangeFailed(err).log())),
        };

        tracing::info!(user = %user_id, "OIDC login successful");

        match self.sessions.create_session(&user_id).await {
            Ok(session_headers) => Ok(CallbackOutcome::Succeeded {
                user_id,
                session_headers,
            }),
            Err(err) => Ok(CallbackOutcome::Failed(FlowError::from(err).log())),
        }
    }

    async fn exchange(
        &self,
        provider: &dyn OidcProvider,
        state: &str,
        code: &str,
    ) -> Result<UserId, ProviderError> {
        tokio::time::timeout(self.exchange_timeout, provider.exchange_callback(state, code))
            .await
            .map_err(|_| ProviderError::Timeout(self.exchange_timeout.as_secs()))?
    }
}
