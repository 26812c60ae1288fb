mod config;
mod errors;
mod store;

use async_trait::async_trait;
use http::HeaderMap;

use crate::coordination::UserId;

pub use config::SESSION_COOKIE_NAME;
pub use errors::SessionError;
pub use store::InMemorySessionStore;

/// Creates a session for an authenticated user.
#[async_trait]
pub trait SessionIssuer: Send + Sync {
    /// Create a session for `user_id` and return the headers that attach it to the response.
    async fn create_session(&self, user_id: &UserId) -> Result<HeaderMap, SessionError>;
}
