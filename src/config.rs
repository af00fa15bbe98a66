//! Process configuration, resolved once in `main` and passed down by reference.
//!
//! Environment:
//!   SEARXNG_URL            full base URL (wins over host/port when non-empty)
//!   SEARXNG_HOST           default `http://localhost`
//!   SEARXNG_PORT           default `8080`
//!   MCP_RELAY_TIMEOUT_SECS per-call timeout, default 60 (also `--timeout-secs`)
//!
//! Absent or empty variables fall back to the defaults silently; only a base URL
//! that does not parse is an error.

use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_SEARXNG_HOST: &str = "http://localhost";
pub const DEFAULT_SEARXNG_PORT: &str = "8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid SearXNG base URL '{raw}': {source}")]
    BaseUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid SearXNG base URL '{0}': only http and https are supported")]
    Scheme(String),
    #[error("timeout must be at least one second")]
    ZeroTimeout,
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Upper bound for one external call (subprocess or HTTP request).
    pub timeout: Duration,
    pub searxng_url: Url,
}

impl RelayConfig {
    /// Resolve from the process environment; `timeout_secs` overrides the env value.
    pub fn from_env(timeout_secs: Option<u64>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), timeout_secs)
    }

    pub fn from_lookup<F>(lookup: F, timeout_secs: Option<u64>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let raw = match var("SEARXNG_URL") {
            Some(full) => full,
            None => {
                let host = var("SEARXNG_HOST").unwrap_or_else(|| DEFAULT_SEARXNG_HOST.to_string());
                let port = var("SEARXNG_PORT").unwrap_or_else(|| DEFAULT_SEARXNG_PORT.to_string());
                format!("{}:{}", host.trim_end_matches('/'), port)
            }
        };
        let searxng_url = Url::parse(&raw).map_err(|source| ConfigError::BaseUrl {
            raw: raw.clone(),
            source,
        })?;
        if !matches!(searxng_url.scheme(), "http" | "https") {
            return Err(ConfigError::Scheme(raw));
        }

        let secs = timeout_secs
            .or_else(|| var("MCP_RELAY_TIMEOUT_SECS").and_then(|v| v.parse().ok()))
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self {
            timeout: Duration::from_secs(secs),
            searxng_url,
        })
    }
}
