//! Central configuration for the oidc_flow crate

use std::sync::LazyLock;
use std::time::Duration;

/// Mount point of the OIDC endpoints.
pub const OIDC_ROUTE_PREFIX: &str = "/api/oidc";

/// Path the identity provider redirects back to. Must match the address supplied at login start.
pub const OIDC_CALLBACK_PATH: &str = "/api/oidc/callback";

/// Where the browser lands after any failed callback.
pub const OIDC_FAILURE_REDIRECT: &str = "/login?error=oidc_failed";

/// Where the browser lands after a successful callback.
pub const OIDC_SUCCESS_REDIRECT: &str = "/";

/// Upper bound on a single code exchange with the identity provider.
/// Default: 30 seconds
pub(crate) static OIDC_EXCHANGE_TIMEOUT: LazyLock<Duration> = LazyLock::new(|| {
    Duration::from_secs(parse_timeout_secs(
        std::env::var("OIDC_EXCHANGE_TIMEOUT_SECS").ok().as_deref(),
    ))
});

fn parse_timeout_secs(value: Option<&str>) -> u64 {
    value
        .and_then(|s| s.parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(30)
}
