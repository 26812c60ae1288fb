//! Callback address resolution
//!
//! The callback address is derived from the inbound request rather than from
//! configuration, so one binary serves local and proxied deployments alike.

use std::fmt;

use crate::config::OIDC_CALLBACK_PATH;

/// Transport facts about an inbound request needed to rebuild its public origin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestTransport {
    /// The connection itself was TLS-terminated by this process.
    pub tls: bool,
    /// Value of the `X-Forwarded-Proto` header, if any.
    pub forwarded_proto: Option<String>,
    /// Host (and optional port) the request was addressed to.
    pub host: String,
}

impl RequestTransport {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            tls: false,
            forwarded_proto: None,
            host: host.into(),
        }
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_forwarded_proto(mut self, proto: impl Into<String>) -> Self {
        self.forwarded_proto = Some(proto.into());
        self
    }
}

/// Fully-qualified URL the identity provider must redirect back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackAddress(String);

impl CallbackAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// The scheme portion, i.e. everything before `://`.
    pub fn scheme(&self) -> &str {
        self.0.split_once("://").map_or("", |(scheme, _)| scheme)
    }
}

impl fmt::Display for CallbackAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CallbackAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive the callback address for a request.
///
/// Direct TLS always wins. Otherwise a non-empty forwarding hint is used verbatim,
/// with no allow-list; this is only sound behind a trusted reverse proxy.
/// Without either, the scheme is `http`.
pub fn resolve_callback_address(transport: &RequestTransport) -> CallbackAddress {
    let scheme = if transport.tls {
        "https"
    } else {
        match transport.forwarded_proto.as_deref() {
            Some(proto) if !proto.is_empty() => proto,
            _ => "http",
        }
    };

    CallbackAddress(format!(
        "{}://{}{}",
        scheme, transport.host, OIDC_CALLBACK_PATH
    ))
}
