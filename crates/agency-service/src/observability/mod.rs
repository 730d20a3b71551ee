//! Prometheus metrics recorder and recording helpers.

pub mod metrics;
