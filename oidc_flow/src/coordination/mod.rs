//! Authentication flow coordination
//!
//! High-level operations driven by the web layer:
//! - `login`: resolve the callback address and ask the provider for an authorization URL
//! - `callback`: validate the returned parameters, exchange them, and create a session
//!
//! Both are methods on [`OidcFlow`], which owns the optional provider handle.

mod callback;
mod errors;
mod flow;
mod login;
mod types;

pub use errors::FlowError;
pub use flow::OidcFlow;
pub use types::{AuthorizationRequest, CallbackOutcome, CallbackParameters, UserId};
