use axum::{
    extract::{FromRequestParts, Request},
    middleware::Next,
    response::Response,
};
use http::{header::HOST, request::Parts, uri::Scheme};
use std::convert::Infallible;

use oidc_flow::RequestTransport;

const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Marker inserted into request extensions when this process terminated TLS itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlsConnection;

/// Middleware for routers served by a TLS listener.
///
/// # Example
///
/// ```no_run
/// use axum::{Router, middleware::from_fn};
/// use oidc_flow_axum::mark_tls;
///
/// let https_app: Router = Router::new().layer(from_fn(mark_tls));
/// ```
pub async fn mark_tls(mut req: Request, next: Next) -> Response {
    req.extensions_mut().insert(TlsConnection);
    next.run(req).await
}

/// Transport facts of the current request, available as an Axum extractor
///
/// Never rejects: a request without a `Host` header yields an empty host.
#[derive(Debug, Clone)]
pub struct Transport(pub RequestTransport);

impl<S> FromRequestParts<S> for Transport
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(transport_from_parts(parts)))
    }
}

fn transport_from_parts(parts: &Parts) -> RequestTransport {
    let tls = parts.extensions.get::<TlsConnection>().is_some()
        || parts.uri.scheme() == Some(&Scheme::HTTPS);

    let forwarded_proto = parts
        .headers
        .get(X_FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    // HTTP/2 carries the host in the URI authority instead of a Host header
    let host = parts
        .headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| parts.uri.authority().map(|a| a.to_string()))
        .unwrap_or_default();

    tracing::trace!(tls, ?forwarded_proto, %host, "Request transport");

    RequestTransport {
        tls,
        forwarded_proto,
        host,
    }
}
