//! Access-token verification against the provider's signing keys.

use crate::auth::claims::Claims;
use crate::auth::jwks::{Jwk, JwksClient};
use crate::errors::AgencyError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use std::time::Duration;

/// Verifies bearer tokens: key lookup by `kid`, RSA signature check,
/// and audience/issuer/expiry validation.
pub struct TokenVerifier {
    jwks_client: Arc<JwksClient>,
    audience: String,
    issuer: String,
    algorithms: Vec<Algorithm>,
    leeway: Duration,
}

impl TokenVerifier {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        audience: String,
        issuer: String,
        algorithms: Vec<Algorithm>,
        leeway: Duration,
    ) -> Self {
        Self {
            jwks_client,
            audience,
            issuer,
            algorithms,
            leeway,
        }
    }

    /// Verifies a token end to end and returns its claims.
    ///
    /// # Errors
    ///
    /// - [`AgencyError::MalformedToken`] if the token cannot be parsed
    ///   far enough to read a `kid` (includes oversized tokens).
    /// - [`AgencyError::UnknownSigningKey`] if no published key matches.
    /// - [`AgencyError::JwksUnavailable`] if the key set cannot be
    ///   fetched.
    /// - [`AgencyError::TokenExpired`], [`AgencyError::InvalidClaims`],
    ///   [`AgencyError::InvalidSignature`], or
    ///   [`AgencyError::UnparseableToken`] from signature and claims
    ///   validation.
    #[tracing::instrument(skip_all, name = "agency.auth.verify")]
    pub async fn verify(&self, token: &str) -> Result<Claims, AgencyError> {
        let kid = common::jwt::extract_kid(token).map_err(|e| {
            tracing::debug!(target: "agency.auth.jwt", error = %e, "token pre-parse failed");
            AgencyError::MalformedToken
        })?;

        let jwk = self.jwks_client.get_key(&kid).await?;
        self.verify_with_key(token, &jwk)
    }

    /// Signature and claims validation against a specific key.
    fn verify_with_key(&self, token: &str, jwk: &Jwk) -> Result<Claims, AgencyError> {
        if jwk.kty != "RSA" {
            tracing::warn!(
                target: "agency.auth.jwt",
                kty = %jwk.kty,
                "matched JWK has unsupported key type"
            );
            return Err(AgencyError::UnparseableToken);
        }

        let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
            tracing::warn!(target: "agency.auth.jwt", "matched JWK lacks RSA components");
            return Err(AgencyError::UnparseableToken);
        };

        let decoding_key = DecodingKey::from_rsa_components(n, e).map_err(|err| {
            tracing::warn!(
                target: "agency.auth.jwt",
                error = %err,
                "JWK has unusable RSA components"
            );
            AgencyError::UnparseableToken
        })?;

        let default_alg = self.algorithms.first().copied().unwrap_or(Algorithm::RS256);
        let mut validation = Validation::new(default_alg);
        validation.algorithms = self.algorithms.clone();
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.leeway = self.leeway.as_secs();

        let token_data =
            decode::<Claims>(token, &decoding_key, &validation).map_err(map_decode_error)?;

        Ok(token_data.claims)
    }
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> AgencyError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AgencyError::TokenExpired,
        ErrorKind::InvalidAudience
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AgencyError::InvalidClaims,
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::MissingAlgorithm => AgencyError::InvalidSignature,
        other => {
            tracing::debug!(
                target: "agency.auth.jwt",
                kind = ?other,
                "token failed to decode"
            );
            AgencyError::UnparseableToken
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use agency_test_utils::keys::{TestClaims, TestKeypair};
    use std::time::Duration;

    fn verifier() -> TokenVerifier {
        let jwks_client = Arc::new(
            JwksClient::new(
                "http://127.0.0.1:1/jwks.json".to_string(),
                Duration::from_secs(300),
            )
            .unwrap(),
        );
        TokenVerifier::new(
            jwks_client,
            "casting-agency".to_string(),
            "https://agency-dev.auth0.com/".to_string(),
            vec![Algorithm::RS256],
            Duration::ZERO,
        )
    }

    fn jwk_for(keypair: &TestKeypair) -> Jwk {
        serde_json::from_value(keypair.jwk_json()).unwrap()
    }

    fn valid_claims() -> TestClaims {
        TestClaims::new(
            "casting-agency",
            "https://agency-dev.auth0.com/",
            "auth0|tester",
        )
        .with_permissions(&["view:actors"])
    }

    #[test]
    fn test_valid_token_round_trip() {
        let keypair = TestKeypair::primary();
        let token = keypair.sign_token(&valid_claims());
        let claims = verifier()
            .verify_with_key(&token, &jwk_for(&keypair))
            .unwrap();
        assert_eq!(claims.sub.as_deref(), Some("auth0|tester"));
        assert!(claims.has_permission("view:actors"));
    }

    #[test]
    fn test_token_without_subject_is_accepted() {
        // Machine-to-machine tokens carry no sub claim.
        let keypair = TestKeypair::primary();
        let token = keypair.sign_token(&valid_claims().without_sub());
        let claims = verifier()
            .verify_with_key(&token, &jwk_for(&keypair))
            .unwrap();
        assert!(claims.sub.is_none());
        assert!(claims.has_permission("view:actors"));
    }

    #[test]
    fn test_expired_token() {
        let keypair = TestKeypair::primary();
        let token = keypair.sign_token(&valid_claims().expired());
        let err = verifier()
            .verify_with_key(&token, &jwk_for(&keypair))
            .unwrap_err();
        assert_eq!(err, AgencyError::TokenExpired);
    }

    #[test]
    fn test_wrong_audience() {
        let keypair = TestKeypair::primary();
        let claims = TestClaims::new(
            "some-other-api",
            "https://agency-dev.auth0.com/",
            "auth0|tester",
        );
        let token = keypair.sign_token(&claims);
        let err = verifier()
            .verify_with_key(&token, &jwk_for(&keypair))
            .unwrap_err();
        assert_eq!(err, AgencyError::InvalidClaims);
    }

    #[test]
    fn test_wrong_issuer() {
        let keypair = TestKeypair::primary();
        let claims = TestClaims::new(
            "casting-agency",
            "https://evil.example.com/",
            "auth0|tester",
        );
        let token = keypair.sign_token(&claims);
        let err = verifier()
            .verify_with_key(&token, &jwk_for(&keypair))
            .unwrap_err();
        assert_eq!(err, AgencyError::InvalidClaims);
    }

    #[test]
    fn test_signature_from_different_key() {
        // Signed by the secondary key but presented with the primary
        // key's public components.
        let signer = TestKeypair::secondary();
        let token = signer.sign_token(&valid_claims());
        let err = verifier()
            .verify_with_key(&token, &jwk_for(&TestKeypair::primary()))
            .unwrap_err();
        assert_eq!(err, AgencyError::InvalidSignature);
    }

    #[test]
    fn test_hs256_token_rejected() {
        let keypair = TestKeypair::primary();
        let token = keypair.sign_hs256_token(&valid_claims());
        let err = verifier()
            .verify_with_key(&token, &jwk_for(&keypair))
            .unwrap_err();
        assert_eq!(err, AgencyError::InvalidSignature);
    }

    #[test]
    fn test_non_rsa_key_rejected() {
        let keypair = TestKeypair::primary();
        let token = keypair.sign_token(&valid_claims());
        let jwk: Jwk = serde_json::from_value(serde_json::json!({
            "kty": "OKP",
            "kid": keypair.kid,
        }))
        .unwrap();
        let err = verifier().verify_with_key(&token, &jwk).unwrap_err();
        assert_eq!(err, AgencyError::UnparseableToken);
    }

    #[test]
    fn test_jwk_without_components_rejected() {
        let keypair = TestKeypair::primary();
        let token = keypair.sign_token(&valid_claims());
        let jwk: Jwk = serde_json::from_value(serde_json::json!({
            "kty": "RSA",
            "kid": keypair.kid,
        }))
        .unwrap();
        let err = verifier().verify_with_key(&token, &jwk).unwrap_err();
        assert_eq!(err, AgencyError::UnparseableToken);
    }

    #[test]
    fn test_jwk_with_invalid_base64_rejected() {
        let keypair = TestKeypair::primary();
        let token = keypair.sign_token(&valid_claims());
        let jwk: Jwk = serde_json::from_value(serde_json::json!({
            "kty": "RSA",
            "kid": keypair.kid,
            "n": "!!not base64url!!",
            "e": "AQAB",
        }))
        .unwrap();
        let err = verifier().verify_with_key(&token, &jwk).unwrap_err();
        assert_eq!(err, AgencyError::UnparseableToken);
    }

    #[test]
    fn test_garbage_signature_segment() {
        let keypair = TestKeypair::primary();
        let token = keypair.sign_token(&valid_claims());
        let (head, _sig) = token.rsplit_once('.').unwrap();
        let token = format!("{head}.AAAA");
        let err = verifier()
            .verify_with_key(&token, &jwk_for(&keypair))
            .unwrap_err();
        // Depending on length the signature fails base64 or crypto
        // checks; either way it must not validate.
        assert!(matches!(
            err,
            AgencyError::InvalidSignature | AgencyError::UnparseableToken
        ));
    }

    #[test]
    fn test_leeway_accepts_recently_expired_token() {
        let keypair = TestKeypair::primary();
        let token = keypair.sign_token(&valid_claims().expiring_in(-30));
        let jwks_client = Arc::new(
            JwksClient::new(
                "http://127.0.0.1:1/jwks.json".to_string(),
                Duration::from_secs(300),
            )
            .unwrap(),
        );
        let lenient = TokenVerifier::new(
            jwks_client,
            "casting-agency".to_string(),
            "https://agency-dev.auth0.com/".to_string(),
            vec![Algorithm::RS256],
            Duration::from_secs(120),
        );
        assert!(lenient
            .verify_with_key(&token, &jwk_for(&keypair))
            .is_ok());
    }

    #[tokio::test]
    async fn test_verify_rejects_malformed_token_before_network() {
        // The JWKS URL is unroutable; a malformed token must fail fast
        // without ever fetching keys.
        let err = verifier().verify("not-a-jwt").await.unwrap_err();
        assert_eq!(err, AgencyError::MalformedToken);
    }

    #[tokio::test]
    async fn test_verify_rejects_token_without_kid_before_network() {
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        use base64::Engine;
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(b"{}");
        let token = format!("{header}.{payload}.sig");
        let err = verifier().verify(&token).await.unwrap_err();
        assert_eq!(err, AgencyError::MalformedToken);
    }

    #[test]
    fn test_map_decode_error_claim_kinds() {
        let claims_err =
            jsonwebtoken::errors::Error::from(ErrorKind::MissingRequiredClaim("aud".to_string()));
        assert_eq!(map_decode_error(claims_err), AgencyError::InvalidClaims);
        let imm = jsonwebtoken::errors::Error::from(ErrorKind::ImmatureSignature);
        assert_eq!(map_decode_error(imm), AgencyError::InvalidClaims);
    }

    #[test]
    fn test_validation_requires_exp_aud_iss() {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&["casting-agency"]);
        validation.set_issuer(&["https://agency-dev.auth0.com/"]);
        assert!(validation.required_spec_claims.contains("exp"));
        assert!(validation.required_spec_claims.contains("aud"));
        assert!(validation.required_spec_claims.contains("iss"));
    }
}
