use std::time::Duration;
use url::{Host, Url};

use super::errors::ProviderError;

const DEFAULT_SCOPE: &str = "openid email profile";
const DEFAULT_STATE_TTL_SECS: u64 = 600;
const MAX_STATE_TTL_SECS: u64 = 24 * 60 * 60;

/// Endpoints and credentials for an OpenID Connect provider.
///
/// Endpoints are configured explicitly; no discovery document is fetched.
#[derive(Debug, Clone)]
pub struct OidcClientConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Expected `iss` claim of issued ID tokens
    pub issuer: String,
    pub auth_url: String,
    pub token_url: String,
    /// Key set used to verify ID token signatures
    pub jwks_url: String,
    pub scope: String,
    /// How long a started login may wait for its callback
    pub state_ttl: Duration,
}

impl OidcClientConfig {
    /// Read the configuration from the environment.
    ///
    /// Returns `Ok(None)` when `OIDC_CLIENT_ID` is unset, which means OIDC is disabled.
    /// Once a client id is present, the remaining required variables must be too:
    /// `OIDC_CLIENT_SECRET`, `OIDC_ISSUER`, `OIDC_AUTH_URL`, `OIDC_TOKEN_URL`,
    /// `OIDC_JWKS_URL`. `OIDC_SCOPE` and `OIDC_STATE_TTL_SECS` are optional.
    pub fn from_env() -> Result<Option<Self>, ProviderError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, ProviderError> {
        let Some(client_id) = lookup("OIDC_CLIENT_ID").filter(|v| !v.is_empty()) else {
            tracing::info!("OIDC_CLIENT_ID not set, OIDC login disabled");
            return Ok(None);
        };

        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ProviderError::Config(format!("{key} must be set")))
        };

        let state_ttl_secs = match lookup("OIDC_STATE_TTL_SECS") {
            Some(value) => value.trim().parse().map_err(|_| {
                ProviderError::Config(format!("OIDC_STATE_TTL_SECS is not a number: {value}"))
            })?,
            None => DEFAULT_STATE_TTL_SECS,
        };

        let config = Self {
            client_id,
            client_secret: required("OIDC_CLIENT_SECRET")?,
            issuer: required("OIDC_ISSUER")?,
            auth_url: required("OIDC_AUTH_URL")?,
            token_url: required("OIDC_TOKEN_URL")?,
            jwks_url: required("OIDC_JWKS_URL")?,
            scope: lookup("OIDC_SCOPE")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            state_ttl: Duration::from_secs(state_ttl_secs),
        };

        config.validate()?;
        Ok(Some(config))
    }

    /// Check endpoint URLs and the state lifetime.
    ///
    /// Endpoints must use `https`; plain `http` is accepted only for loopback hosts.
    pub(super) fn validate(&self) -> Result<(), ProviderError> {
        for (name, value) in [
            ("OIDC_AUTH_URL", &self.auth_url),
            ("OIDC_TOKEN_URL", &self.token_url),
            ("OIDC_JWKS_URL", &self.jwks_url),
        ] {
            let url = Url::parse(value)
                .map_err(|e| ProviderError::Config(format!("{name} is not a valid URL: {e}")))?;
            if !is_secure_endpoint(&url) {
                return Err(ProviderError::Config(format!(
                    "{name} must use https: {value}"
                )));
            }
        }

        let ttl = self.state_ttl.as_secs();
        if ttl == 0 || ttl > MAX_STATE_TTL_SECS {
            return Err(ProviderError::Config(format!(
                "OIDC_STATE_TTL_SECS must be between 1 and {MAX_STATE_TTL_SECS}, got {ttl}"
            )));
        }

        Ok(())
    }
}

fn is_secure_endpoint(url: &Url) -> bool {
    match url.scheme() {
        "https" => true,
        "http" => match url.host() {
            Some(Host::Domain(domain)) => domain == "localhost",
            Some(Host::Ipv4(ip)) => ip.is_loopback(),
            Some(Host::Ipv6(ip)) => ip.is_loopback(),
            None => false,
        },
        _ => false,
    }
}
