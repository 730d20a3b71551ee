//! Casting agency resource API with bearer-token authorization.
//!
//! An Axum HTTP service that guards a small actors/movies catalog behind
//! RS256 access tokens issued by an external identity provider. Every
//! protected route runs the same pipeline: extract the bearer token from
//! the `Authorization` header, verify its signature against the
//! provider's published JWKS, validate audience/issuer/expiry, then
//! check the route's required permission against the token's
//! `permissions` claim.
//!
//! # Architecture
//!
//! - `config` - Environment-based configuration with validation
//! - `errors` - Error taxonomy and HTTP response mapping
//! - `auth` - JWKS client, token verification, claims
//! - `middleware` - Authorization and metrics middleware
//! - `handlers` - HTTP endpoint handlers
//! - `models` - Request/response and catalog types
//! - `routes` - Router composition and shared state
//! - `observability` - Prometheus metrics recorder and helpers

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
