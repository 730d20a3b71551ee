//! Token verification: JWKS fetching, signature/claims validation, and
//! permission checks.

pub mod claims;
pub mod jwks;
pub mod verify;

pub use claims::{check_permission, Claims};
pub use jwks::JwksClient;
pub use verify::TokenVerifier;
