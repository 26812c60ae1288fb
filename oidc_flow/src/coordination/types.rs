use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{OIDC_FAILURE_REDIRECT, OIDC_SUCCESS_REDIRECT};

use super::errors::FlowError;

/// Identifier of a user authenticated by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authorization URL for the browser to follow, returned to the API caller as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationRequest {
    pub auth_url: String,
}

/// Query parameters the identity provider sends back to the callback address.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParameters {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub code: String,
    /// Set by the provider instead of `code` when the user denied consent
    /// or the request was invalid
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl CallbackParameters {
    pub fn new(state: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            code: code.into(),
            ..Default::default()
        }
    }

    /// Build parameters from decoded query pairs. When a key repeats, the first
    /// value wins; unknown keys are ignored.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut state = None;
        let mut code = None;
        let mut error = None;
        let mut error_description = None;

        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "state" => &mut state,
                "code" => &mut code,
                "error" => &mut error,
                "error_description" => &mut error_description,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }

        Self {
            state: state.unwrap_or_default(),
            code: code.unwrap_or_default(),
            error,
            error_description,
        }
    }
}

/// Terminal result of one callback invocation.
#[derive(Debug)]
pub enum CallbackOutcome {
    Succeeded {
        user_id: UserId,
        /// Headers attaching the new session to the response (Set-Cookie)
        session_headers: HeaderMap,
    },
    Failed(FlowError),
}

impl CallbackOutcome {
    /// Where the browser should be sent with a temporary redirect.
    pub fn redirect_target(&self) -> &'static str {
        match self {
            Self::Succeeded { .. } => OIDC_SUCCESS_REDIRECT,
            Self::Failed(_) => OIDC_FAILURE_REDIRECT,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}
