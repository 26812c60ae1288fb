//! Error types for the coordination layer

use thiserror::Error;

use crate::provider::ProviderError;
use crate::session::SessionError;

/// Message shown to API callers whenever login start fails upstream.
const UPSTREAM_PUBLIC_MESSAGE: &str = "Failed to start OIDC login";

/// Errors that can occur while coordinating an OIDC login or callback
#[derive(Error, Debug, Clone)]
pub enum FlowError {
    /// No OIDC provider is configured for this deployment
    #[error("OIDC is not configured")]
    NotConfigured,

    /// `state` or `code` was absent from the callback query
    #[error("Missing state or code in callback")]
    MissingParameters,

    /// The provider rejected or could not complete the code exchange
    #[error("OIDC callback failed: {0}")]
    ExchangeFailed(ProviderError),

    /// The provider could not produce an authorization URL
    #[error("Failed to build authorization URL: {0}")]
    UpstreamError(ProviderError),

    /// The exchange succeeded but no session could be created
    #[error("Failed to create session: {0}")]
    SessionCreation(SessionError),
}

impl FlowError {
    /// Log the error and return self
    ///
    /// Full detail goes to the log only; callers use [`FlowError::public_message`]
    /// for anything that leaves the server.
    pub fn log(self) -> Self {
        match &self {
            Self::NotConfigured => tracing::debug!("OIDC is not configured"),
            Self::MissingParameters => tracing::debug!("OIDC callback missing state or code"),
            Self::ExchangeFailed(err) => tracing::error!(error = %err, "OIDC callback failed"),
            Self::UpstreamError(err) => tracing::error!(error = %err, "OIDC auth url"),
            Self::SessionCreation(err) => {
                tracing::error!(error = %err, "OIDC session creation failed")
            }
        }
        self
    }

    /// Message safe to expose to an unauthenticated caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::NotConfigured => "OIDC is not configured",
            Self::UpstreamError(_) => UPSTREAM_PUBLIC_MESSAGE,
            Self::MissingParameters | Self::ExchangeFailed(_) | Self::SessionCreation(_) => {
                "oidc_failed"
            }
        }
    }
}

impl From<SessionError> for FlowError {
    fn from(err: SessionError) -> Self {
        Self::SessionCreation(err)
    }
}
