use chrono::Utc;
use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey};

use crate::utils::base64url_decode;

use super::errors::ProviderError;
use super::types::IdClaims;

/// Allowed clock difference between us and the provider, in seconds.
const CLOCK_SKEW_SECS: i64 = 2;

/// Check the signature of a compact JWS against the provider's key set.
///
/// The key is selected by the header `kid`; a token without `kid` is accepted
/// only when the set holds a single key. Symmetric algorithms are rejected.
pub(super) fn verify_signature(token: &str, jwks: &JwkSet) -> Result<(), ProviderError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(ProviderError::IdToken("Invalid token format".to_string()));
    }

    let header = jsonwebtoken::decode_header(token)
        .map_err(|e| ProviderError::IdToken(format!("Invalid token header: {e}")))?;
    let alg = header.alg;
    tracing::debug!("Algorithm from JWT header: {:?}", alg);

    let jwk = find_jwk(jwks, header.kid.as_deref()).ok_or(ProviderError::NoMatchingKey)?;
    if !key_supports(jwk, alg) {
        return Err(ProviderError::InvalidSignature(format!(
            "Key does not support {alg:?}"
        )));
    }

    let decoding_key =
        DecodingKey::from_jwk(jwk).map_err(|e| ProviderError::Jwks(e.to_string()))?;
    let message = format!("{}.{}", parts[0], parts[1]);

    let valid = jsonwebtoken::crypto::verify(parts[2], message.as_bytes(), &decoding_key, alg)
        .map_err(|e| ProviderError::InvalidSignature(e.to_string()))?;
    if !valid {
        return Err(ProviderError::InvalidSignature(
            "Signature does not match".to_string(),
        ));
    }

    Ok(())
}

fn find_jwk<'a>(jwks: &'a JwkSet, kid: Option<&str>) -> Option<&'a Jwk> {
    match kid {
        Some(kid) => jwks.find(kid),
        None => match jwks.keys.as_slice() {
            [only] => Some(only),
            _ => None,
        },
    }
}

fn key_supports(jwk: &Jwk, alg: Algorithm) -> bool {
    use Algorithm::*;

    let family_matches = matches!(
        (&jwk.algorithm, alg),
        (
            AlgorithmParameters::RSA(_),
            RS256 | RS384 | RS512 | PS256 | PS384 | PS512
        ) | (AlgorithmParameters::EllipticCurve(_), ES256 | ES384)
            | (AlgorithmParameters::OctetKeyPair(_), EdDSA)
    );

    // A key that names its algorithm may only be used with that one
    family_matches
        && jwk
            .common
            .key_algorithm
            .as_ref()
            .is_none_or(|key_alg| format!("{key_alg:?}") == format!("{alg:?}"))
}

/// Decode the payload of a compact JWS. The signature must already have been
/// checked with [`verify_signature`].
pub(super) fn decode_claims(token: &str) -> Result<IdClaims, ProviderError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(ProviderError::IdToken("Invalid token format".to_string()));
    }

    let payload = base64url_decode(parts[1])?;
    serde_json::from_slice(&payload)
        .map_err(|e| ProviderError::IdToken(format!("Invalid claims: {e}")))
}

pub(super) fn validate_claims(
    claims: &IdClaims,
    issuer: &str,
    client_id: &str,
    expected_nonce: &str,
) -> Result<(), ProviderError> {
    if claims.iss != issuer {
        return Err(ProviderError::IdToken(format!(
            "Invalid issuer, expected: {issuer}, actual: {}",
            claims.iss
        )));
    }

    if !claims.aud.contains(client_id) {
        return Err(ProviderError::IdToken(format!(
            "Invalid audience, expected: {client_id}"
        )));
    }

    let now = Utc::now().timestamp();
    if now > claims.exp + CLOCK_SKEW_SECS {
        return Err(ProviderError::IdToken("Token expired".to_string()));
    }
    if let Some(iat) = claims.iat {
        if now + CLOCK_SKEW_SECS < iat {
            return Err(ProviderError::IdToken(format!(
                "Token not yet valid, now: {now}, iat: {iat}"
            )));
        }
    }

    if claims.nonce.as_deref() != Some(expected_nonce) {
        tracing::debug!("Nonce in ID token: {:?}", claims.nonce);
        return Err(ProviderError::NonceMismatch);
    }

    if claims.sub.is_empty() {
        return Err(ProviderError::IdToken("Empty subject".to_string()));
    }

    Ok(())
}

#[cfg(test)]
fn encode_unsigned_token(claims: &serde_json::Value) -> String {
    use crate::utils::base64url_encode;

    format!(
        "{}.{}.{}",
        base64url_encode(br#"{"alg":"RS256","typ":"JWT"}"#),
        base64url_encode(claims.to_string()),
        base64url_encode(b"signature")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestSigner;
    use crate::utils::base64url_encode;
    use serde_json::json;

    fn key_set(value: serde_json::Value) -> JwkSet {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_signed_token_verifies() {
        let signer = TestSigner::new("key-1");
        let token = signer.sign(&json!({"sub": "user-1"}));

        assert!(verify_signature(&token, &key_set(signer.jwks())).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let signer = TestSigner::new("key-1");
        let token = signer.sign(&json!({"sub": "user-1"}));
        let parts: Vec<&str> = token.split('.').collect();
        let forged = format!(
            "{}.{}.{}",
            parts[0],
            base64url_encode(json!({"sub": "admin"}).to_string()),
            parts[2]
        );

        let result = verify_signature(&forged, &key_set(signer.jwks()));

        assert!(matches!(result, Err(ProviderError::InvalidSignature(_))));
    }

    #[test]
    fn test_signature_from_other_key_rejected() {
        let signer = TestSigner::new("key-1");
        let impostor = TestSigner::new("key-1");
        let token = impostor.sign(&json!({"sub": "user-1"}));

        let result = verify_signature(&token, &key_set(signer.jwks()));

        assert!(matches!(result, Err(ProviderError::InvalidSignature(_))));
    }

    #[test]
    fn test_unsigned_tokens_rejected() {
        let signer = TestSigner::new("key-1");
        let jwks = key_set(signer.jwks());

        let stripped = signer.sign(&json!({"sub": "user-1"}));
        let stripped = format!("{}.", &stripped[..stripped.rfind('.').unwrap()]);
        assert!(matches!(
            verify_signature(&stripped, &jwks),
            Err(ProviderError::InvalidSignature(_))
        ));

        // "none" is not an algorithm jsonwebtoken accepts
        let none = format!(
            "{}.{}.",
            base64url_encode(br#"{"alg":"none","kid":"key-1"}"#),
            base64url_encode(br#"{"sub":"user-1"}"#)
        );
        assert!(matches!(
            verify_signature(&none, &jwks),
            Err(ProviderError::IdToken(_))
        ));
    }

    #[test]
    fn test_unknown_kid() {
        let signer = TestSigner::new("key-1");
        let other = TestSigner::new("key-2");
        let token = other.sign(&json!({"sub": "user-1"}));

        let result = verify_signature(&token, &key_set(signer.jwks()));

        assert!(matches!(result, Err(ProviderError::NoMatchingKey)));
    }

    #[test]
    fn test_missing_kid_uses_single_key() {
        let signer = TestSigner::new("key-1");
        let token = signer.sign_with_header(
            &json!({"alg": "ES256", "typ": "JWT"}),
            &json!({"sub": "user-1"}),
        );

        assert!(verify_signature(&token, &key_set(signer.jwks())).is_ok());

        let mut two_keys = signer.jwks();
        let extra = TestSigner::new("key-2").jwks()["keys"][0].clone();
        two_keys["keys"].as_array_mut().unwrap().push(extra);
        assert!(matches!(
            verify_signature(&token, &key_set(two_keys)),
            Err(ProviderError::NoMatchingKey)
        ));
    }

    #[test]
    fn test_symmetric_algorithm_rejected() {
        let signer = TestSigner::new("key-1");
        let token = signer.sign_with_header(
            &json!({"alg": "HS256", "typ": "JWT", "kid": "key-1"}),
            &json!({"sub": "user-1"}),
        );

        let result = verify_signature(&token, &key_set(signer.jwks()));

        assert!(
            matches!(result, Err(ProviderError::InvalidSignature(msg)) if msg.contains("HS256"))
        );
    }

    #[test]
    fn test_algorithm_must_match_key() {
        let signer = TestSigner::new("key-1");
        let token = signer.sign_with_header(
            &json!({"alg": "RS256", "typ": "JWT", "kid": "key-1"}),
            &json!({"sub": "user-1"}),
        );

        let result = verify_signature(&token, &key_set(signer.jwks()));

        assert!(matches!(result, Err(ProviderError::InvalidSignature(_))));
    }

    fn claims(overrides: serde_json::Value) -> IdClaims {
        let now = Utc::now().timestamp();
        let mut base = json!({
            "iss": "https://idp.example.com",
            "sub": "user-1",
            "aud": "client-123",
            "exp": now + 300,
            "iat": now,
            "nonce": "n-1"
        });
        if let (Some(base), Some(overrides)) = (base.as_object_mut(), overrides.as_object()) {
            for (k, v) in overrides {
                base.insert(k.clone(), v.clone());
            }
        }
        decode_claims(&encode_unsigned_token(&base)).unwrap()
    }

    fn validate(claims: &IdClaims) -> Result<(), ProviderError> {
        validate_claims(claims, "https://idp.example.com", "client-123", "n-1")
    }

    #[test]
    fn test_valid_claims() {
        let claims = claims(json!({}));
        assert_eq!(claims.sub, "user-1");
        assert!(validate(&claims).is_ok());
    }

    #[test]
    fn test_audience_array() {
        let claims = claims(json!({"aud": ["other", "client-123"]}));
        assert!(validate(&claims).is_ok());
    }

    #[test]
    fn test_wrong_audience() {
        let claims = claims(json!({"aud": ["other"]}));
        assert!(
            matches!(validate(&claims), Err(ProviderError::IdToken(msg)) if msg.contains("audience"))
        );
    }

    #[test]
    fn test_wrong_issuer() {
        let claims = claims(json!({"iss": "https://evil.example.com"}));
        assert!(
            matches!(validate(&claims), Err(ProviderError::IdToken(msg)) if msg.contains("issuer"))
        );
    }

    #[test]
    fn test_expired_token() {
        let claims = claims(json!({"exp": Utc::now().timestamp() - 60}));
        assert!(
            matches!(validate(&claims), Err(ProviderError::IdToken(msg)) if msg == "Token expired")
        );
    }

    #[test]
    fn test_issued_in_future() {
        let claims = claims(json!({"iat": Utc::now().timestamp() + 600}));
        assert!(matches!(validate(&claims), Err(ProviderError::IdToken(_))));
    }

    #[test]
    fn test_nonce_mismatch_and_missing() {
        let wrong = claims(json!({"nonce": "n-2"}));
        assert!(matches!(validate(&wrong), Err(ProviderError::NonceMismatch)));

        let missing = claims(json!({"nonce": null}));
        assert!(matches!(validate(&missing), Err(ProviderError::NonceMismatch)));
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(matches!(
            decode_claims("only.two"),
            Err(ProviderError::IdToken(_))
        ));
        assert!(matches!(
            decode_claims("a.!!!.c"),
            Err(ProviderError::Utils(_))
        ));
        let not_json = format!("a.{}.c", crate::utils::base64url_encode("plain"));
        assert!(matches!(
            decode_claims(&not_json),
            Err(ProviderError::IdToken(_))
        ));
    }
}
