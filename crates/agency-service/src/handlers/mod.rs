//! HTTP endpoint handlers.

pub mod actors;
pub mod health;
pub mod me;
pub mod metrics;
pub mod movies;
