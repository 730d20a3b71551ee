//! JWKS client for fetching RSA signing keys from the identity
//! provider.
//!
//! Keys are fetched from `https://{domain}/.well-known/jwks.json` and
//! cached for a configurable TTL. A TTL of zero disables caching and
//! fetches on every lookup. A `kid` that is absent from a still-fresh
//! cache is a definitive miss; rotated keys are picked up when the
//! cache expires.

use crate::errors::AgencyError;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// A single JSON Web Key, RSA members only.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type; must be `"RSA"` to be usable here.
    pub kty: String,
    /// Key identifier matched against the token header's `kid`.
    pub kid: String,
    /// RSA modulus, base64url without padding.
    #[serde(default)]
    pub n: Option<String>,
    /// RSA public exponent, base64url without padding.
    #[serde(default)]
    pub e: Option<String>,
    /// Intended algorithm, e.g. `"RS256"`.
    #[serde(default)]
    pub alg: Option<String>,
    /// Intended key use, e.g. `"sig"`.
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,
}

/// JWKS document shape.
#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

struct CachedJwks {
    keys: HashMap<String, Jwk>,
    expires_at: Instant,
}

/// Fetches and caches the provider's signing keys.
pub struct JwksClient {
    jwks_url: String,
    http_client: reqwest::Client,
    cache: Arc<RwLock<Option<CachedJwks>>>,
    cache_ttl: Duration,
}

impl JwksClient {
    /// Creates a client for the given JWKS URL.
    ///
    /// # Errors
    ///
    /// Returns [`AgencyError::Internal`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(jwks_url: String, cache_ttl: Duration) -> Result<Self, AgencyError> {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| AgencyError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            jwks_url,
            http_client,
            cache: Arc::new(RwLock::new(None)),
            cache_ttl,
        })
    }

    /// Returns the key with the given `kid`.
    ///
    /// # Errors
    ///
    /// - [`AgencyError::UnknownSigningKey`] if the key set does not
    ///   contain `kid`.
    /// - [`AgencyError::JwksUnavailable`] if the key set cannot be
    ///   fetched or parsed.
    pub async fn get_key(&self, kid: &str) -> Result<Jwk, AgencyError> {
        if !self.cache_ttl.is_zero() {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at > Instant::now() {
                    return cached
                        .keys
                        .get(kid)
                        .cloned()
                        .ok_or(AgencyError::UnknownSigningKey);
                }
            }
        }

        let keys = self.fetch_keys().await?;
        let result = keys.get(kid).cloned().ok_or(AgencyError::UnknownSigningKey);

        if !self.cache_ttl.is_zero() {
            let mut cache = self.cache.write().await;
            *cache = Some(CachedJwks {
                keys,
                expires_at: Instant::now() + self.cache_ttl,
            });
        }

        result
    }

    async fn fetch_keys(&self) -> Result<HashMap<String, Jwk>, AgencyError> {
        tracing::debug!(
            target: "agency.auth.jwks",
            url = %self.jwks_url,
            "fetching JWKS"
        );

        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AgencyError::JwksUnavailable(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AgencyError::JwksUnavailable(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let jwks: JwksResponse = response
            .json()
            .await
            .map_err(|e| AgencyError::JwksUnavailable(format!("invalid JWKS document: {e}")))?;

        let keys: HashMap<String, Jwk> = jwks
            .keys
            .into_iter()
            .map(|key| (key.kid.clone(), key))
            .collect();

        tracing::debug!(
            target: "agency.auth.jwks",
            key_count = keys.len(),
            "JWKS fetched"
        );

        Ok(keys)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_jwk_deserialization() {
        let json = serde_json::json!({
            "kty": "RSA",
            "kid": "key-1",
            "use": "sig",
            "alg": "RS256",
            "n": "0vx7agoebGcQSuuPiLJXZpt",
            "e": "AQAB"
        });
        let jwk: Jwk = serde_json::from_value(json).unwrap();
        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.kid, "key-1");
        assert_eq!(jwk.key_use.as_deref(), Some("sig"));
        assert_eq!(jwk.alg.as_deref(), Some("RS256"));
        assert_eq!(jwk.e.as_deref(), Some("AQAB"));
    }

    #[test]
    fn test_jwk_deserialization_minimal() {
        // Providers may publish keys without use/alg hints.
        let json = serde_json::json!({
            "kty": "RSA",
            "kid": "key-2",
        });
        let jwk: Jwk = serde_json::from_value(json).unwrap();
        assert!(jwk.n.is_none());
        assert!(jwk.e.is_none());
        assert!(jwk.alg.is_none());
        assert!(jwk.key_use.is_none());
    }

    #[test]
    fn test_jwks_response_deserialization() {
        let json = serde_json::json!({
            "keys": [
                {"kty": "RSA", "kid": "a", "n": "abc", "e": "AQAB"},
                {"kty": "EC", "kid": "b"}
            ]
        });
        let jwks: JwksResponse = serde_json::from_value(json).unwrap();
        assert_eq!(jwks.keys.len(), 2);
    }

    #[test]
    fn test_client_creation() {
        let client = JwksClient::new(
            "https://agency-dev.auth0.com/.well-known/jwks.json".to_string(),
            Duration::from_secs(300),
        );
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_jwks_is_unavailable_not_unknown_key() {
        // Nothing listens on port 1; the connection is refused
        // immediately.
        let client = JwksClient::new(
            "http://127.0.0.1:1/jwks.json".to_string(),
            Duration::ZERO,
        )
        .unwrap();
        let err = client.get_key("any").await.unwrap_err();
        assert!(matches!(err, AgencyError::JwksUnavailable(_)));
    }
}
