//! Common utilities shared across the casting agency workspace.
//!
//! This crate contains the pre-verification JWT plumbing that both the
//! service and the test utilities rely on:
//!
//! - [`jwt`] - Token size limits, unverified header parsing (`kid`
//!   extraction), and leeway bounds for configuration validation.

#![warn(clippy::pedantic)]

pub mod jwt;
