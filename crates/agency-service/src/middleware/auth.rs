//! Authorization middleware.
//!
//! Protected routes are wrapped with [`require_auth`] (token must
//! verify) or [`require_permission`] (token must verify AND grant a
//! specific permission). On success the verified [`Claims`] are stored
//! in request extensions for handlers; on failure the request is
//! short-circuited with the error's HTTP rendering.

use crate::auth::claims::{check_permission, Claims};
use crate::auth::verify::TokenVerifier;
use crate::errors::AgencyError;
use crate::observability::metrics::{record_auth_failure, record_auth_success};
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

const MUST_START_WITH_BEARER: &str = "Authorization header must start with \"Bearer\".";
const TOKEN_NOT_FOUND: &str = "Token not found.";
const MUST_BE_BEARER_TOKEN: &str = "Authorization header must be bearer token.";

/// Shared state for [`require_auth`].
#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<TokenVerifier>,
}

/// Shared state for [`require_permission`]: the verifier plus the
/// permission this particular route demands.
#[derive(Clone)]
pub struct PermissionState {
    pub verifier: Arc<TokenVerifier>,
    pub permission: &'static str,
}

/// Pulls the bearer token out of the `Authorization` header.
///
/// The header value is split on whitespace. The scheme comparison is
/// case-insensitive; everything else about the shape is strict.
///
/// # Errors
///
/// - [`AgencyError::MissingAuthHeader`] if the header is absent.
/// - [`AgencyError::InvalidAuthHeader`] if the scheme is not `Bearer`,
///   the token part is missing, or there are trailing parts.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AgencyError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AgencyError::MissingAuthHeader)?;
    let value = value
        .to_str()
        .map_err(|_| AgencyError::InvalidAuthHeader(MUST_START_WITH_BEARER))?;

    let mut parts = value.split_whitespace();
    let scheme = parts
        .next()
        .ok_or(AgencyError::InvalidAuthHeader(MUST_START_WITH_BEARER))?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AgencyError::InvalidAuthHeader(MUST_START_WITH_BEARER));
    }
    let token = parts
        .next()
        .ok_or(AgencyError::InvalidAuthHeader(TOKEN_NOT_FOUND))?;
    if parts.next().is_some() {
        return Err(AgencyError::InvalidAuthHeader(MUST_BE_BEARER_TOKEN));
    }
    Ok(token)
}

async fn authenticate(
    verifier: &TokenVerifier,
    headers: &HeaderMap,
) -> Result<Claims, AgencyError> {
    let token = extract_bearer_token(headers)?;
    verifier.verify(token).await
}

/// Middleware: the request must carry a valid access token.
#[tracing::instrument(skip_all, name = "agency.middleware.require_auth")]
pub async fn require_auth(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AgencyError> {
    match authenticate(&state.verifier, request.headers()).await {
        Ok(claims) => {
            record_auth_success();
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(err) => {
            record_auth_failure(err.error_code());
            tracing::debug!(
                target: "agency.middleware.auth",
                code = err.error_code(),
                "authentication rejected"
            );
            Err(err)
        }
    }
}

/// Middleware: the request must carry a valid access token that grants
/// the permission configured in [`PermissionState`].
#[tracing::instrument(skip_all, name = "agency.middleware.require_permission")]
pub async fn require_permission(
    State(state): State<PermissionState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AgencyError> {
    let outcome = match authenticate(&state.verifier, request.headers()).await {
        Ok(claims) => check_permission(state.permission, &claims).map(|()| claims),
        Err(err) => Err(err),
    };

    match outcome {
        Ok(claims) => {
            record_auth_success();
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(err) => {
            record_auth_failure(err.error_code());
            tracing::debug!(
                target: "agency.middleware.auth",
                code = err.error_code(),
                permission = state.permission,
                "authorization rejected"
            );
            Err(err)
        }
    }
}
