//! oidc_flow - OpenID Connect login coordination
//!
//! This crate coordinates the browser side of an OpenID Connect login:
//! deriving the callback address from the inbound request, producing the
//! provider's authorization URL, and completing the callback by exchanging
//! the returned code and creating a session.
//!
//! The identity provider and the session store are collaborators behind the
//! [`OidcProvider`] and [`SessionIssuer`] traits. [`OidcClient`] and
//! [`InMemorySessionStore`] are the bundled implementations.

mod config;
mod coordination;
mod provider;
mod redirect;
mod session;
mod utils;

#[cfg(test)]
mod test_utils;

pub use config::{
    OIDC_CALLBACK_PATH, OIDC_FAILURE_REDIRECT, OIDC_ROUTE_PREFIX, OIDC_SUCCESS_REDIRECT,
};

pub use coordination::{
    AuthorizationRequest, CallbackOutcome, CallbackParameters, FlowError, OidcFlow, UserId,
};

pub use provider::{OidcClient, OidcClientConfig, OidcProvider, ProviderError};

pub use redirect::{CallbackAddress, RequestTransport, resolve_callback_address};

pub use session::{InMemorySessionStore, SESSION_COOKIE_NAME, SessionError, SessionIssuer};

pub use utils::UtilError;
