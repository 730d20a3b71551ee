//! Test utilities for the casting agency service.
//!
//! - [`keys`] - Embedded RSA test keypairs and RS256 token minting.
//! - [`harness`] - A spawnable service instance wired to a wiremock
//!   JWKS endpoint.

pub mod harness;
pub mod keys;

pub use harness::{TestAgencyServer, TEST_AUDIENCE, TEST_ISSUER};
pub use keys::{TestClaims, TestKeypair};
