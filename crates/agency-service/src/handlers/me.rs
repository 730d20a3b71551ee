//! Authenticated identity endpoint.

use crate::auth::claims::Claims;
use crate::models::MeResponse;
use axum::{Extension, Json};

/// Handler for `GET /api/v1/me`.
///
/// Echoes the verified claims back to the caller. Requires a valid
/// token but no particular permission, which makes it a convenient
/// integration probe for token setups.
#[tracing::instrument(skip_all, name = "agency.me.get")]
pub async fn get_me(Extension(claims): Extension<Claims>) -> Json<MeResponse> {
    Json(MeResponse {
        sub: claims.sub,
        exp: claims.exp,
        iat: claims.iat,
        permissions: claims.permissions,
    })
}
