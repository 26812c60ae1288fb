mod error;
mod oidc;
mod router;
mod transport;

#[cfg(test)]
mod test_utils;

pub use error::IntoResponseError;
pub use router::{oidc_router, oidc_router_no_trace};
pub use transport::{TlsConnection, Transport, mark_tls};

// Re-export the core types needed to assemble a flow
pub use oidc_flow::{
    CallbackOutcome, CallbackParameters, FlowError, InMemorySessionStore, OIDC_CALLBACK_PATH,
    OIDC_ROUTE_PREFIX, OidcClient, OidcClientConfig, OidcFlow, OidcProvider, RequestTransport,
    SESSION_COOKIE_NAME, SessionIssuer, UserId,
};
