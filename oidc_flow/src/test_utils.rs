//! Test collaborators shared across the crate's unit tests
//!
//! Both mocks count their invocations so tests can assert that no exchange or
//! session creation happened on paths that must short-circuit.

use async_trait::async_trait;
use http::HeaderMap;
use http::header::SET_COOKIE;
use ring::rand::SystemRandom;
use ring::signature::{ECDSA_P256_SHA256_FIXED_SIGNING, EcdsaKeyPair, KeyPair};
use serde_json::{Value, json};
use std::env;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::coordination::UserId;
use crate::provider::{OidcProvider, ProviderError};
use crate::redirect::CallbackAddress;
use crate::session::{SessionError, SessionIssuer};
use crate::utils::base64url_encode;

enum Behaviour {
    Succeed(String),
    FailAuthorization(ProviderError),
    FailExchange(ProviderError),
    Slow(String, Duration),
}

pub(crate) struct MockProvider {
    behaviour: Behaviour,
    authorization_calls: AtomicUsize,
    exchange_calls: AtomicUsize,
    last_callback: Mutex<Option<String>>,
    last_exchange: Mutex<Option<(String, String)>>,
}

impl MockProvider {
    fn with(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            authorization_calls: AtomicUsize::new(0),
            exchange_calls: AtomicUsize::new(0),
            last_callback: Mutex::new(None),
            last_exchange: Mutex::new(None),
        }
    }

    pub(crate) fn succeeding(user_id: &str) -> Self {
        Self::with(Behaviour::Succeed(user_id.to_string()))
    }

    pub(crate) fn failing_authorization(err: ProviderError) -> Self {
        Self::with(Behaviour::FailAuthorization(err))
    }

    pub(crate) fn failing_exchange(err: ProviderError) -> Self {
        Self::with(Behaviour::FailExchange(err))
    }

    pub(crate) fn slow(user_id: &str, delay: Duration) -> Self {
        Self::with(Behaviour::Slow(user_id.to_string(), delay))
    }

    pub(crate) fn authorization_calls(&self) -> usize {
        self.authorization_calls.load(Ordering::SeqCst)
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
impl OidcProvider for MockProvider {
    async fn authorization_url(
        &self,
        callback: &CallbackAddress,
    ) -> Result<String, ProviderError> {
        self.authorization_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_callback.lock().unwrap() = Some(callback.to_string());

        match &self.behaviour {
            Behaviour::FailAuthorization(err) => Err(err.clone()),
            _ => Ok(format!(
                "https://idp.test/authorize?redirect_uri={callback}"
            )),
        }
    }

    async fn exchange_callback(&self, state: &str, code: &str) -> Result<UserId, ProviderError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_exchange.lock().unwrap() = Some((state.to_string(), code.to_string()));

        match &self.behaviour {
            Behaviour::Succeed(user_id) => Ok(UserId::new(user_id.clone())),
            Behaviour::Slow(user_id, delay) => {
                tokio::time::sleep(*delay).await;
                Ok(UserId::new(user_id.clone()))
            }
            Behaviour::FailExchange(err) => Err(err.clone()),
            Behaviour::FailAuthorization(err) => Err(err.clone()),
        }
    }
}

#[derive(Default)]
pub(crate) struct MockSessions {
    failure: Option<SessionError>,
    created: Mutex<Vec<UserId>>,
}

impl MockSessions {
    pub(crate) fn failing(err: SessionError) -> Self {
        Self {
            failure: Some(err),
            created: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn created_for(&self) -> Vec<UserId> {
        self.created.lock().unwrap().clone()
    }

    pub(crate) fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionIssuer for MockSessions {
    async fn create_session(&self, user_id: &UserId) -> Result<HeaderMap, SessionError> {
        self.created.lock().unwrap().push(user_id.clone());

        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

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

/// Set an environment variable for the duration of `test` and restore it afterward.
pub(crate) fn with_env_var<F, R>(key: &str, value: Option<&str>, test: F) -> R
where
    F: FnOnce() -> R,
{
    let original = env::var(key).ok();

    match value {
        Some(val) => unsafe { env::set_var(key, val) },
        None => unsafe { env::remove_var(key) },
    }

    let result = test();

    match original {
        Some(val) => unsafe { env::set_var(key, val) },
        None => unsafe { env::remove_var(key) },
    }

    result
}

/// ES256 key pair that signs ID tokens and publishes its public half as a JWKS.
pub(crate) struct TestSigner {
    kid: String,
    key_pair: EcdsaKeyPair,
    rng: SystemRandom,
}

impl TestSigner {
    pub(crate) fn new(kid: &str) -> Self {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &rng).unwrap();
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8.as_ref(), &rng)
                .unwrap();
        Self {
            kid: kid.to_string(),
            key_pair,
            rng,
        }
    }

    pub(crate) fn jwks(&self) -> Value {
        // Uncompressed point: 0x04 || x || y
        let point = self.key_pair.public_key().as_ref();
        json!({
            "keys": [{
                "kty": "EC",
                "crv": "P-256",
                "x": base64url_encode(&point[1..33]),
                "y": base64url_encode(&point[33..65]),
                "kid": self.kid,
                "alg": "ES256",
                "use": "sig",
            }]
        })
    }

    pub(crate) fn sign(&self, claims: &Value) -> String {
        self.sign_with_header(
            &json!({"alg": "ES256", "typ": "JWT", "kid": self.kid}),
            claims,
        )
    }

    pub(crate) fn sign_with_header(&self, header: &Value, claims: &Value) -> String {
        let signing_input = format!(
            "{}.{}",
            base64url_encode(header.to_string()),
            base64url_encode(claims.to_string())
        );
        let signature = self
            .key_pair
            .sign(&self.rng, signing_input.as_bytes())
            .unwrap();
        format!("{signing_input}.{}", base64url_encode(signature.as_ref()))
    }
}

/// In-memory writer for capturing formatted log output.
#[derive(Clone, Default)]
pub(crate) struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    /// Install a subscriber writing into this buffer for the current thread.
    pub(crate) fn capture(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
