//! Error taxonomy and HTTP response mapping.
//!
//! Every failure in the authorization pipeline maps to a stable
//! `(status, code, message)` triple rendered as:
//!
//! ```json
//! {"error": {"code": "token_expired", "message": "Token expired."}}
//! ```
//!
//! 401 responses additionally carry a `WWW-Authenticate` header per
//! RFC 6750. Messages are fixed strings that never echo token contents;
//! anything diagnostic goes to server-side logs only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Machine-readable code plus human-readable message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Service error type.
///
/// The auth variants mirror the behavior of the upstream identity
/// provider's reference integrations, so clients written against those
/// see identical codes, statuses, and descriptions.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AgencyError {
    /// No `Authorization` header on a protected route.
    #[error("Authorization header is expected.")]
    MissingAuthHeader,

    /// `Authorization` header present but not a well-formed bearer
    /// credential. The payload is the client-facing description.
    #[error("{0}")]
    InvalidAuthHeader(&'static str),

    /// Token failed pre-verification parsing (bad segment count, bad
    /// header encoding, or no `kid`).
    #[error("Authorization malformed.")]
    MalformedToken,

    /// The token's `kid` matched nothing in the JWKS.
    #[error("Unable to find the appropriate key.")]
    UnknownSigningKey,

    /// Token or key material could not be used for verification.
    #[error("Unable to parse authentication token.")]
    UnparseableToken,

    /// `exp` is in the past.
    #[error("Token expired.")]
    TokenExpired,

    /// Audience or issuer mismatch, or a required claim is absent.
    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,

    /// Signature did not verify, or the token's algorithm is not in the
    /// configured allow list.
    #[error("Incorrect token. Please, check the provided token.")]
    InvalidSignature,

    /// Verified token carries no `permissions` claim at all.
    #[error("Permissions not included in the token.")]
    MissingPermissions,

    /// Verified token lacks the permission the route requires.
    #[error("Permission not found.")]
    PermissionNotFound,

    /// Requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Signing keys could not be fetched or parsed. The payload is
    /// logged server-side and never sent to clients.
    #[error("JWKS unavailable: {0}")]
    JwksUnavailable(String),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AgencyError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAuthHeader
            | Self::InvalidAuthHeader(_)
            | Self::MalformedToken
            | Self::TokenExpired
            | Self::InvalidClaims
            | Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::UnknownSigningKey | Self::UnparseableToken => StatusCode::BAD_REQUEST,
            Self::MissingPermissions | Self::PermissionNotFound => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::JwksUnavailable(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code. Also used as a bounded metrics
    /// label, so every variant must map to a fixed string.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingAuthHeader => "authorization_header_missing",
            Self::InvalidAuthHeader(_)
            | Self::MalformedToken
            | Self::UnknownSigningKey
            | Self::UnparseableToken => "invalid_header",
            Self::TokenExpired => "token_expired",
            Self::InvalidClaims | Self::MissingPermissions => "invalid_claims",
            Self::InvalidSignature => "invalid_token",
            Self::PermissionNotFound => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::JwksUnavailable(_) | Self::Internal(_) => "internal_error",
        }
    }

    /// Message sent to the client. Server-only detail is replaced with
    /// a generic string.
    fn client_message(&self) -> String {
        match self {
            Self::JwksUnavailable(_) | Self::Internal(_) => {
                "An internal error occurred.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AgencyError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(target: "agency.errors", error = %self, "internal error");
        }

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.client_message(),
            },
        });

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            if let Ok(value) = axum::http::HeaderValue::from_str(
                "Bearer realm=\"casting-agency-api\", error=\"invalid_token\"",
            ) {
                response
                    .headers_mut()
                    .insert(axum::http::header::WWW_AUTHENTICATE, value);
            }
        }
        response
    }
}
