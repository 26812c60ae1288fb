//! Router for the OIDC endpoints

use axum::Router;
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use oidc_flow::{OIDC_ROUTE_PREFIX, OidcFlow};

/// Create a router for the OIDC endpoints
///
/// The endpoints will be available at:
/// - {OIDC_ROUTE_PREFIX}/enabled
/// - {OIDC_ROUTE_PREFIX}/login
/// - {OIDC_ROUTE_PREFIX}/callback
///
/// Merge it into the application router. When the application is also served over
/// TLS, wrap that listener's router with [`crate::mark_tls`] so callback addresses
/// use `https`.
pub fn oidc_router(flow: OidcFlow) -> Router {
    oidc_router_no_trace(flow).layer(
        TraceLayer::new_for_http()
            .make_span_with(
                DefaultMakeSpan::new()
                    .level(Level::INFO)
                    .include_headers(true),
            )
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as `oidc_router()` but without the HTTP tracing middleware.
pub fn oidc_router_no_trace(flow: OidcFlow) -> Router {
    Router::new().nest(OIDC_ROUTE_PREFIX, super::oidc::router(flow))
}
