//! Collaborator stubs and request helpers for router tests

use async_trait::async_trait;
use axum::body::Body;
use http::{HeaderMap, Request, Response, header::SET_COOKIE};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use oidc_flow::{
    CallbackAddress, OidcProvider, ProviderError, SessionError, SessionIssuer, UserId,
};

/// Provider returning a fixed user, or the same error from every call.
pub(crate) struct StubProvider {
    result: Result<String, ProviderError>,
    exchange_calls: AtomicUsize,
    last_callback: Mutex<Option<String>>,
    last_exchange: Mutex<Option<(String, String)>>,
}

impl StubProvider {
    pub(crate) fn succeeding(user_id: &str) -> Self {
        Self::with(Ok(user_id.to_string()))
    }

    pub(crate) fn failing(err: ProviderError) -> Self {
        Self::with(Err(err))
    }

    fn with(result: Result<String, ProviderError>) -> Self {
        Self {
            result,
            exchange_calls: AtomicUsize::new(0),
            last_callback: Mutex::new(None),
            last_exchange: Mutex::new(None),
        }
    }

    pub(crate) fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_callback(&self) -> Option<String> {
        self.last_callback.lock().unwrap().clone()
    }

    pub(crate) fn last_exchange(&self) -> Option<(String, String)> {
        self.last_exchange.lock().unwrap().clone()
    }
}

#[async_trait]
impl OidcProvider for StubProvider {
    async fn authorization_url(
        &self,
        callback: &CallbackAddress,
    ) -> Result<String, ProviderError> {
        *self.last_callback.lock().unwrap() = Some(callback.to_string());
        self.result
            .clone()
            .map(|_| format!("https://idp.test/authorize?redirect_uri={callback}"))
    }

    async fn exchange_callback(&self, state: &str, code: &str) -> Result<UserId, ProviderError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_exchange.lock().unwrap() = Some((state.to_string(), code.to_string()));
        self.result.clone().map(UserId::new)
    }
}

#[derive(Default)]
pub(crate) struct StubSessions;

#[async_trait]
impl SessionIssuer for StubSessions {
    async fn create_session(&self, user_id: &UserId) -> Result<HeaderMap, SessionError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            SET_COOKIE,
            format!("session=for-{user_id}")
                .parse()
                .map_err(|_| SessionError::HeaderError("bad cookie".to_string()))?,
        );
        Ok(headers)
    }
}

pub(crate) fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Host", "localhost:3001")
        .body(Body::empty())
        .unwrap()
}

pub(crate) async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
