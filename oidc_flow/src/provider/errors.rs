use thiserror::Error;

use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum ProviderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid authorization URL: {0}")]
    AuthorizationUrl(String),

    #[error("Unknown or already used state")]
    UnknownState,

    #[error("State expired")]
    StateExpired,

    #[error("Token exchange error: {0}")]
    TokenExchange(String),

    #[error("Id token error: {0}")]
    IdToken(String),

    #[error("JWKS error: {0}")]
    Jwks(String),

    #[error("No matching key found in JWKS")]
    NoMatchingKey,

    #[error("Invalid token signature: {0}")]
    InvalidSignature(String),

    #[error("Nonce mismatch")]
    NonceMismatch,

    #[error("Exchange timed out after {0} seconds")]
    Timeout(u64),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}
