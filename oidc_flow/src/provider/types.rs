use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Secrets generated at login start and needed again at callback time.
#[derive(Debug, Clone)]
pub(super) struct PendingLogin {
    pub(super) nonce: String,
    pub(super) pkce_verifier: String,
    pub(super) redirect_uri: String,
    pub(super) expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    #[allow(dead_code)]
    pub(super) token_type: Option<String>,
    pub(super) id_token: Option<String>,
}

/// `aud` may be a single string or an array of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    pub(super) fn contains(&self, client_id: &str) -> bool {
        match self {
            Self::One(aud) => aud == client_id,
            Self::Many(auds) => auds.iter().any(|aud| aud == client_id),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct IdClaims {
    pub(super) iss: String,
    pub(super) sub: String,
    pub(super) aud: Audience,
    pub(super) exp: i64,
    pub(super) iat: Option<i64>,
    pub(super) nonce: Option<String>,
}
