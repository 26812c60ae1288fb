use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use sha2::{Digest, Sha256};
use std::time::Duration;
use url::Url;

use crate::coordination::UserId;
use crate::redirect::CallbackAddress;
use crate::utils::{base64url_encode, gen_random_string};

use super::OidcProvider;
use super::config::OidcClientConfig;
use super::errors::ProviderError;
use super::idtoken::{decode_claims, validate_claims, verify_signature};
use super::jwks::JwksCache;
use super::pending::PendingLogins;
use super::types::{PendingLogin, TokenResponse};

/// Authorization-code flow client with PKCE for a provider with known endpoints.
///
/// `state`, `nonce` and the PKCE verifier for each started login are kept in
/// process memory until the matching callback arrives or they expire.
/// ID tokens are accepted only with a valid signature from the provider's JWKS.
pub struct OidcClient {
    config: OidcClientConfig,
    http: reqwest::Client,
    pending: PendingLogins,
    jwks: JwksCache,
}

impl OidcClient {
    pub fn new(config: OidcClientConfig) -> Result<Self, ProviderError> {
        config.validate()?;

        // Requests should complete quickly; the pool settings match reqwest's defaults
        // apart from an explicit idle cap.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| ProviderError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            jwks: JwksCache::new(config.jwks_url.as_str()),
            config,
            http,
            pending: PendingLogins::default(),
        })
    }

    /// Build a client from the environment, or `None` when OIDC is not configured.
    pub fn from_env() -> Result<Option<Self>, ProviderError> {
        OidcClientConfig::from_env()?.map(Self::new).transpose()
    }

    pub fn config(&self) -> &OidcClientConfig {
        &self.config
    }

    async fn request_id_token(
        &self,
        code: &str,
        login: &PendingLogin,
    ) -> Result<String, ProviderError> {
        let response = self
            .http
            .post(self.config.token_url.as_str())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", login.redirect_uri.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code_verifier", login.pkce_verifier.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::TokenExchange(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Token endpoint returned {}: {}", status, body);
            return Err(ProviderError::TokenExchange(status.to_string()));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::TokenExchange(e.to_string()))?;

        token_response.id_token.ok_or_else(|| {
            ProviderError::TokenExchange("ID token not present in response".to_string())
        })
    }

    async fn verify_id_token_signature(&self, id_token: &str) -> Result<(), ProviderError> {
        let jwks = self.jwks.get(&self.http).await?;
        match verify_signature(id_token, &jwks) {
            Err(ProviderError::NoMatchingKey) => {
                tracing::debug!("Signing key not in cached JWKs, refetching");
                let jwks = self.jwks.refresh(&self.http).await?;
                verify_signature(id_token, &jwks)
            }
            result => result,
        }
    }
}

#[async_trait]
impl OidcProvider for OidcClient {
    async fn authorization_url(
        &self,
        callback: &CallbackAddress,
    ) -> Result<String, ProviderError> {
        let state = gen_random_string(32)?;
        let nonce = gen_random_string(32)?;
        let pkce_verifier = gen_random_string(32)?;
        let pkce_challenge = base64url_encode(Sha256::digest(pkce_verifier.as_bytes()));

        let mut auth_url = Url::parse(&self.config.auth_url)
            .map_err(|e| ProviderError::AuthorizationUrl(e.to_string()))?;
        auth_url
            .query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", callback.as_str())
            .append_pair("scope", &self.config.scope)
            .append_pair("state", &state)
            .append_pair("nonce", &nonce)
            .append_pair("code_challenge", &pkce_challenge)
            .append_pair("code_challenge_method", "S256");

        let expires_at = ChronoDuration::from_std(self.config.state_ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| ProviderError::Config("State TTL out of range".to_string()))?;

        self.pending
            .insert(
                state,
                PendingLogin {
                    nonce,
                    pkce_verifier,
                    redirect_uri: callback.to_string(),
                    expires_at,
                },
            )
            .await;

        tracing::debug!("Auth URL: {}", auth_url);
        Ok(auth_url.into())
    }

    async fn exchange_callback(&self, state: &str, code: &str) -> Result<UserId, ProviderError> {
        let login = self.pending.take(state).await?;

        let id_token = self.request_id_token(code, &login).await?;
        self.verify_id_token_signature(&id_token).await?;
        let claims = decode_claims(&id_token)?;
        validate_claims(
            &claims,
            &self.config.issuer,
            &self.config.client_id,
            &login.nonce,
        )?;

        Ok(UserId::new(claims.sub))
    }
}
