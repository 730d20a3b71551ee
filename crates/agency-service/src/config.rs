//! Service configuration loaded from environment variables.
//!
//! Configuration is read through [`Config::from_vars`] so tests can
//! inject a plain `HashMap` instead of mutating process environment.
//! Every field is validated at load time; a service with a bad
//! configuration refuses to start rather than failing requests later.

use common::jwt::{DEFAULT_LEEWAY, MAX_LEEWAY};
use jsonwebtoken::Algorithm;
use std::collections::HashMap;
use std::time::Duration;

/// Default TTL for cached JWKS responses, in seconds.
pub const DEFAULT_JWKS_CACHE_TTL_SECONDS: u64 = 300;

/// Configuration errors surfaced at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Runtime configuration for the service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Socket address the HTTP server binds to.
    pub bind_address: String,
    /// Identity provider domain, e.g. `agency-dev.auth0.com`.
    pub auth_domain: String,
    /// Expected `aud` claim of accepted tokens.
    pub audience: String,
    /// Expected `iss` claim. Defaults to `https://{auth_domain}/`.
    pub issuer: String,
    /// JWKS document URL. Defaults to
    /// `https://{auth_domain}/.well-known/jwks.json`.
    pub jwks_url: String,
    /// Accepted signing algorithms. RSA family only.
    pub algorithms: Vec<Algorithm>,
    /// How long a fetched JWKS is served from cache. Zero disables
    /// caching and fetches on every key lookup.
    pub jwks_cache_ttl: Duration,
    /// Leeway applied to `exp` validation.
    pub leeway: Duration,
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is absent or any
    /// value fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Loads configuration from the given variable map.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is absent or any
    /// value fails validation.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let auth_domain = require_non_empty(vars, "AUTH_DOMAIN")?;
        let audience = require_non_empty(vars, "AUTH_AUDIENCE")?;

        let issuer = match vars.get("AUTH_ISSUER") {
            Some(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => format!("https://{auth_domain}/"),
        };

        let jwks_url = match vars.get("AUTH_JWKS_URL") {
            Some(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => format!("https://{auth_domain}/.well-known/jwks.json"),
        };

        let algorithms = parse_algorithms(
            vars.get("AUTH_ALGORITHMS").map_or("RS256", String::as_str),
        )?;

        let jwks_cache_ttl = Duration::from_secs(parse_u64(
            vars,
            "JWKS_CACHE_TTL_SECONDS",
            DEFAULT_JWKS_CACHE_TTL_SECONDS,
        )?);

        let leeway = Duration::from_secs(parse_u64(
            vars,
            "JWT_LEEWAY_SECONDS",
            DEFAULT_LEEWAY.as_secs(),
        )?);
        if leeway > MAX_LEEWAY {
            return Err(ConfigError::Invalid {
                name: "JWT_LEEWAY_SECONDS",
                reason: format!(
                    "must not exceed {} seconds, got {}",
                    MAX_LEEWAY.as_secs(),
                    leeway.as_secs()
                ),
            });
        }

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());

        Ok(Self {
            bind_address,
            auth_domain,
            audience,
            issuer,
            jwks_url,
            algorithms,
            jwks_cache_ttl,
            leeway,
        })
    }
}

fn require_non_empty(
    vars: &HashMap<String, String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    match vars.get(name) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        Some(_) => Err(ConfigError::Invalid {
            name,
            reason: "must not be empty".to_string(),
        }),
        None => Err(ConfigError::Missing(name)),
    }
}

fn parse_u64(
    vars: &HashMap<String, String>,
    name: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match vars.get(name) {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            reason: format!("must be a non-negative integer, got {v:?}"),
        }),
        None => Ok(default),
    }
}

/// Parses a comma-separated algorithm list, accepting the RSA family
/// only. Symmetric and EC algorithms are rejected outright so a
/// misconfiguration can never open the door to HS256 confusion.
fn parse_algorithms(raw: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let mut algorithms = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let alg = match part {
            "RS256" => Algorithm::RS256,
            "RS384" => Algorithm::RS384,
            "RS512" => Algorithm::RS512,
            other => {
                return Err(ConfigError::Invalid {
                    name: "AUTH_ALGORITHMS",
                    reason: format!("unsupported algorithm {other:?} (RS256/RS384/RS512 only)"),
                })
            }
        };
        if !algorithms.contains(&alg) {
            algorithms.push(alg);
        }
    }
    if algorithms.is_empty() {
        return Err(ConfigError::Invalid {
            name: "AUTH_ALGORITHMS",
            reason: "must name at least one algorithm".to_string(),
        });
    }
    Ok(algorithms)
}
