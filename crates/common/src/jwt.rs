//! JWT pre-verification utilities.
//!
//! Everything in this module runs BEFORE any signature check, so it must
//! be safe against hostile input: the token is size-capped, split, and
//! only the protected header is base64-decoded and parsed. No claims are
//! trusted at this stage.
//!
//! # Security
//!
//! Error display strings are deliberately generic. Detailed failure
//! reasons are for server-side logs only; callers map these variants to
//! their own client-facing responses.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::time::Duration;

/// Maximum accepted size of an encoded JWT in bytes.
///
/// Tokens larger than this are rejected before any decoding to bound
/// memory and CPU spent on unauthenticated input. 8 KiB is far above any
/// legitimate access token.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Default leeway applied to time-based claim checks.
pub const DEFAULT_LEEWAY: Duration = Duration::from_secs(0);

/// Upper bound for configurable leeway.
///
/// Ten minutes of clock drift means broken infrastructure, not a
/// tolerance a service should paper over.
pub const MAX_LEEWAY: Duration = Duration::from_secs(600);

/// Errors from pre-verification token handling.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Encoded token exceeds [`MAX_JWT_SIZE_BYTES`].
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token is not three dot-separated base64url segments, or the
    /// protected header is not valid base64url-encoded JSON.
    #[error("The access token is invalid or expired")]
    MalformedToken,

    /// Protected header carries no usable `kid` member.
    #[error("The access token is invalid or expired")]
    MissingKid,
}

/// Extracts the `kid` from a JWT's protected header without verifying
/// the signature.
///
/// The `kid` is needed to pick the right public key out of a JWKS before
/// verification can happen, which is why this runs on untrusted input.
///
/// # Errors
///
/// - [`JwtValidationError::TokenTooLarge`] if the encoded token exceeds
///   the size cap.
/// - [`JwtValidationError::MalformedToken`] if the token is not three
///   segments or the header fails to decode/parse.
/// - [`JwtValidationError::MissingKid`] if the header has no `kid`, or
///   `kid` is not a non-empty string.
pub fn extract_kid(token: &str) -> Result<String, JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        return Err(JwtValidationError::TokenTooLarge);
    }

    let mut segments = token.split('.');
    let header_b64 = segments.next().ok_or(JwtValidationError::MalformedToken)?;
    // A compact JWS is exactly header.payload.signature.
    if segments.count() != 2 {
        return Err(JwtValidationError::MalformedToken);
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_b64)
        .map_err(|_| JwtValidationError::MalformedToken)?;
    let header: serde_json::Value =
        serde_json::from_slice(&header_bytes).map_err(|_| JwtValidationError::MalformedToken)?;

    match header.get("kid").and_then(|v| v.as_str()) {
        Some(kid) if !kid.is_empty() => Ok(kid.to_string()),
        _ => Err(JwtValidationError::MissingKid),
    }
}
