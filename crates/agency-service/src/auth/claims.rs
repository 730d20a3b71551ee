//! Verified access-token claims.

use crate::errors::AgencyError;
use serde::{Deserialize, Serialize};

/// Claims decoded from a verified access token.
///
/// `aud` and `iss` are validated during signature verification and not
/// retained here. Only `exp` is mandatory; tokens without a `sub` are
/// still valid credentials. The `permissions` claim is the provider's
/// RBAC extension; its absence is meaningful (the token was issued
/// without permissions enabled) and is distinguished from an empty
/// list.
#[derive(Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user or machine identity).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    /// Issued-at, seconds since the Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Permissions granted to the subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

// Manual Debug: `sub` identifies a person and must not leak into logs.
impl std::fmt::Debug for Claims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &self.sub.as_deref().map(|_| "[REDACTED]"))
            .field("exp", &self.exp)
            .field("iat", &self.iat)
            .field("permissions", &self.permissions)
            .finish()
    }
}

impl Claims {
    /// Whether the token grants the given permission.
    ///
    /// Absent and empty `permissions` both answer `false`; use
    /// [`check_permission`] when the two must produce different errors.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_ref()
            .is_some_and(|perms| perms.iter().any(|p| p == permission))
    }
}

/// Checks a required permission against verified claims.
///
/// # Errors
///
/// - [`AgencyError::MissingPermissions`] if the token has no
///   `permissions` claim at all.
/// - [`AgencyError::PermissionNotFound`] if the claim exists but does
///   not contain `permission`.
pub fn check_permission(permission: &str, claims: &Claims) -> Result<(), AgencyError> {
    let Some(permissions) = claims.permissions.as_ref() else {
        return Err(AgencyError::MissingPermissions);
    };
    if !permissions.iter().any(|p| p == permission) {
        return Err(AgencyError::PermissionNotFound);
    }
    Ok(())
}
