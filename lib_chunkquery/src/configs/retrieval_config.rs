//! # Retrieval Configuration
//!
//! Layered configuration for chunked retrievals: built-in defaults, then an
//! optional JSON file, then `CHUNKQUERY_*` environment variables. Every field
//! is optional so that layers can be merged field by field, later layers
//! winning.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use std::{env, fs};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ChunkQueryError;
use crate::query::{Paging, DEFAULT_LIMIT_PER_PAGE};
use crate::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "CHUNKQUERY_";

/// Where and how to reach the MSQL endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointConfig {
    /// Absolute base URL of the endpoint.
    pub base_url: Option<String>,
    /// Path of the execute call, relative to `base_url`.
    pub path: Option<String>,
    /// Bearer token sent with every request.
    pub auth_token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl EndpointConfig {
    fn merge(self, other: EndpointConfig) -> EndpointConfig {
        EndpointConfig {
            base_url: other.base_url.or(self.base_url),
            path: other.path.or(self.path),
            auth_token: other.auth_token.or(self.auth_token),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
        }
    }

    /// Request timeout, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Settings for the page fetcher and the retrieval loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    /// Attempts per page fetch.
    pub max_attempts: Option<usize>,
    /// Wait between attempts, in milliseconds.
    pub retry_delay_ms: Option<u64>,
    /// Rows requested per page.
    pub limit_per_page: Option<usize>,
    /// Page cap; absent means unbounded.
    pub max_pages: Option<usize>,
    /// First record to request.
    pub start_offset: Option<usize>,
    /// Log progress at `info` level.
    pub verbose: Option<bool>,
    /// Endpoint settings.
    #[serde(default)]
    pub endpoint: EndpointConfig,
}

impl RetrievalConfig {
    /// The built-in defaults.
    pub fn defaults() -> Self {
        Self {
            max_attempts: Some(DEFAULT_MAX_ATTEMPTS),
            retry_delay_ms: Some(DEFAULT_RETRY_DELAY.as_millis() as u64),
            limit_per_page: Some(DEFAULT_LIMIT_PER_PAGE),
            max_pages: None,
            start_offset: Some(0),
            verbose: Some(false),
            endpoint: EndpointConfig::default(),
        }
    }

    /// Merges two configs, where `other` overrides `self` for `Some` values.
    pub fn merge(self, other: RetrievalConfig) -> RetrievalConfig {
        RetrievalConfig {
            max_attempts: other.max_attempts.or(self.max_attempts),
            retry_delay_ms: other.retry_delay_ms.or(self.retry_delay_ms),
            limit_per_page: other.limit_per_page.or(self.limit_per_page),
            max_pages: other.max_pages.or(self.max_pages),
            start_offset: other.start_offset.or(self.start_offset),
            verbose: other.verbose.or(self.verbose),
            endpoint: self.endpoint.merge(other.endpoint),
        }
    }

    /// Reads a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self, ChunkQueryError> {
        let text = fs::read_to_string(path).map_err(|e| {
            ChunkQueryError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            ChunkQueryError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Builds the override layer from `CHUNKQUERY_*` entries of `vars`.
    pub fn from_env_map(vars: &HashMap<String, String>) -> Result<Self, ChunkQueryError> {
        let get = |name: &str| vars.get(&format!("{ENV_PREFIX}{name}")).map(String::as_str);
        Ok(Self {
            max_attempts: parse_var("MAX_ATTEMPTS", get("MAX_ATTEMPTS"))?,
            retry_delay_ms: parse_var("RETRY_DELAY_MS", get("RETRY_DELAY_MS"))?,
            limit_per_page: parse_var("LIMIT_PER_PAGE", get("LIMIT_PER_PAGE"))?,
            max_pages: parse_var("MAX_PAGES", get("MAX_PAGES"))?,
            start_offset: parse_var("START_OFFSET", get("START_OFFSET"))?,
            verbose: parse_var("VERBOSE", get("VERBOSE"))?,
            endpoint: EndpointConfig {
                base_url: get("BASE_URL").map(str::to_string),
                path: get("PATH").map(str::to_string),
                auth_token: get("AUTH_TOKEN").map(str::to_string),
                timeout_secs: parse_var("TIMEOUT_SECS", get("TIMEOUT_SECS"))?,
            },
        })
    }

    /// Builds the override layer from the process environment.
    pub fn from_env() -> Result<Self, ChunkQueryError> {
        let vars: HashMap<String, String> =
            env::vars().filter(|(k, _)| k.starts_with(ENV_PREFIX)).collect();
        Self::from_env_map(&vars)
    }

    /// Defaults, then `file` if given, then the environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ChunkQueryError> {
        let mut config = Self::defaults();
        if let Some(path) = file {
            debug!(path = %path.display(), "loading retrieval config file");
            config = config.merge(Self::from_json_file(path)?);
        }
        Ok(config.merge(Self::from_env()?))
    }

    /// The retry policy described by this config.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            self.retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_RETRY_DELAY),
        )
    }

    /// The paging parameters described by this config.
    pub fn paging(&self) -> Result<Paging, ChunkQueryError> {
        Paging::new(
            self.start_offset.unwrap_or(0),
            self.limit_per_page.unwrap_or(DEFAULT_LIMIT_PER_PAGE),
            self.max_pages,
        )
    }
}

fn parse_var<T: std::str::FromStr>(
    name: &str,
    value: Option<&str>,
) -> Result<Option<T>, ChunkQueryError>
where
    T::Err: std::fmt::Display,
{
    value
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                ChunkQueryError::Config(format!("{ENV_PREFIX}{name}={raw:?} is invalid: {e}"))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_resolve_to_core_defaults() {
        let config = RetrievalConfig::defaults();
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.paging().unwrap(), Paging::default());
    }

    #[test]
    fn later_layers_win_field_by_field() {
        let file = RetrievalConfig {
            limit_per_page: Some(50),
            max_pages: Some(4),
            endpoint: EndpointConfig {
                base_url: Some("https://file.example/".into()),
                path: Some("Custom".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let env = RetrievalConfig {
            limit_per_page: Some(25),
            endpoint: EndpointConfig {
                base_url: Some("https://env.example/".into()),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = RetrievalConfig::defaults().merge(file).merge(env);

        assert_eq!(merged.limit_per_page, Some(25));
        assert_eq!(merged.max_pages, Some(4));
        assert_eq!(merged.max_attempts, Some(10));
        assert_eq!(merged.endpoint.base_url.as_deref(), Some("https://env.example/"));
        assert_eq!(merged.endpoint.path.as_deref(), Some("Custom"));
    }

    #[test]
    fn reads_camel_case_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"maxAttempts": 3, "retryDelayMs": 500, "endpoint": {{"baseUrl": "http://localhost:8080/", "timeoutSecs": 30}}}}"#
        )
        .unwrap();

        let config = RetrievalConfig::from_json_file(file.path()).unwrap();

        assert_eq!(
            config.retry_policy(),
            RetryPolicy::new(3, Duration::from_millis(500))
        );
        assert_eq!(config.endpoint.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.limit_per_page, None);
    }

    #[test]
    fn env_map_overrides_are_parsed() {
        let vars = HashMap::from([
            ("CHUNKQUERY_LIMIT_PER_PAGE".to_string(), "200".to_string()),
            ("CHUNKQUERY_VERBOSE".to_string(), "true".to_string()),
            ("CHUNKQUERY_AUTH_TOKEN".to_string(), "secret".to_string()),
        ]);
        let config = RetrievalConfig::from_env_map(&vars).unwrap();
        assert_eq!(config.limit_per_page, Some(200));
        assert_eq!(config.verbose, Some(true));
        assert_eq!(config.endpoint.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.max_attempts, None);
    }

    #[test]
    fn bad_env_value_is_a_config_error() {
        let vars = HashMap::from([("CHUNKQUERY_MAX_PAGES".to_string(), "many".to_string())]);
        let err = RetrievalConfig::from_env_map(&vars).unwrap_err();
        assert!(matches!(err, ChunkQueryError::Config(_)));
    }

    #[test]
    fn zero_page_size_fails_paging() {
        let config = RetrievalConfig {
            limit_per_page: Some(0),
            ..RetrievalConfig::defaults()
        };
        assert!(config.paging().is_err());
    }
}
