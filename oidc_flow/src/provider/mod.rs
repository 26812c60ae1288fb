//! OpenID Connect provider collaborator
//!
//! The coordinator only needs two capabilities from a provider: building an
//! authorization URL for a callback address, and turning a returned
//! `state`/`code` pair into a verified user identifier. [`OidcClient`] is the
//! bundled implementation for providers with known endpoints.

mod client;
mod config;
mod errors;
mod idtoken;
mod jwks;
mod pending;
mod types;

use async_trait::async_trait;

use crate::coordination::UserId;
use crate::redirect::CallbackAddress;

pub use client::OidcClient;
pub use config::OidcClientConfig;
pub use errors::ProviderError;

#[async_trait]
pub trait OidcProvider: Send + Sync {
    /// Build an authorization URL whose redirect target is `callback`.
    async fn authorization_url(&self, callback: &CallbackAddress)
    -> Result<String, ProviderError>;

    /// Exchange the `state` and `code` returned by the provider for a user identifier.
    async fn exchange_callback(&self, state: &str, code: &str) -> Result<UserId, ProviderError>;
}
