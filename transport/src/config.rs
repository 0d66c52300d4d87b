//! Client configuration.
//!
//! Loads configuration from environment variables with sensible defaults, or
//! builds it programmatically with the `with_*` methods.

use crate::retry::RetryPolicy;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default capacity of a subscription's update channel
pub const DEFAULT_UPDATE_BUFFER: usize = 64;

/// Errors raised while building or validating a [`ClientConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A URL setting does not parse or has an unsupported scheme
    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl {
        /// Setting name
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// An environment variable holds an unparsable value
    #[error("Invalid value for {var}: {value}")]
    InvalidValue {
        /// Environment variable name
        var: &'static str,
        /// Offending value
        value: String,
    },

    /// A setting is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Deployment environment the client talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development backend
    #[default]
    Development,
    /// Pre-production backend
    Staging,
    /// Production backend
    Production,
}

impl std::str::FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(()),
        }
    }
}

/// Configuration of an event ticketing client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API base URL (`http` or `https`)
    pub base_url: String,
    /// API key sent as a bearer token and as the `apiKey` stream parameter
    pub api_key: String,
    /// Deployment environment
    pub environment: Environment,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// WebSocket URL for update streams; derived from `base_url` when unset
    pub ws_url: Option<String>,
    /// Capacity of each subscription's update channel
    pub update_buffer: usize,
    /// Retry policy for idempotent reads; `None` disables retries
    pub retry: Option<RetryPolicy>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            environment: Environment::Development,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            ws_url: None,
            update_buffer: DEFAULT_UPDATE_BUFFER,
            retry: None,
        }
    }
}

impl ClientConfig {
    /// Create a configuration for `base_url` authenticated with `api_key`.
    ///
    /// Explicitly configured clients target production, matching the
    /// defaults of a released SDK.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            environment: Environment::Production,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `TICKETING_BASE_URL` | `http://localhost:8080` |
    /// | `TICKETING_API_KEY` | empty |
    /// | `TICKETING_ENVIRONMENT` | `development` |
    /// | `TICKETING_TIMEOUT_SECS` | `30` |
    /// | `TICKETING_WS_URL` | derived from the base URL |
    /// | `TICKETING_UPDATE_BUFFER` | `64` |
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable holds an unparsable value or the
    /// resulting configuration is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            base_url: lookup("TICKETING_BASE_URL").unwrap_or(defaults.base_url),
            api_key: lookup("TICKETING_API_KEY").unwrap_or(defaults.api_key),
            environment: parse_var(&lookup, "TICKETING_ENVIRONMENT")?.unwrap_or(defaults.environment),
            timeout_secs: parse_var(&lookup, "TICKETING_TIMEOUT_SECS")?.unwrap_or(defaults.timeout_secs),
            ws_url: lookup("TICKETING_WS_URL"),
            update_buffer: parse_var(&lookup, "TICKETING_UPDATE_BUFFER")?.unwrap_or(defaults.update_buffer),
            retry: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Builder: set the deployment environment
    #[must_use]
    pub const fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Builder: set the request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    /// Builder: set an explicit WebSocket URL
    #[must_use]
    pub fn with_ws_url(mut self, ws_url: impl Into<String>) -> Self {
        self.ws_url = Some(ws_url.into());
        self
    }

    /// Builder: set the per-subscription channel capacity
    #[must_use]
    pub const fn with_update_buffer(mut self, update_buffer: usize) -> Self {
        self.update_buffer = update_buffer;
        self
    }

    /// Builder: retry idempotent reads with `policy`
    #[must_use]
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parsed API base URL without a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] unless the base URL is a valid
    /// `http` or `https` URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let invalid = || ConfigError::InvalidUrl {
            field: "base_url",
            value: self.base_url.clone(),
        };
        let url = Url::parse(self.base_url.trim_end_matches('/')).map_err(|_| invalid())?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(invalid()),
        }
    }

    /// WebSocket URL for update streams.
    ///
    /// Uses `ws_url` when set. Otherwise the base URL's `http` scheme becomes
    /// `ws` (`https` becomes `wss`) and `/ws` is appended to its path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the resulting URL is not a
    /// valid `ws` or `wss` URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use ticketing_sdk_transport::ClientConfig;
    ///
    /// let config = ClientConfig::new("https://api.example.com", "key");
    /// assert_eq!(config.ws_url().unwrap().as_str(), "wss://api.example.com/ws");
    /// ```
    pub fn ws_url(&self) -> Result<Url, ConfigError> {
        let (field, raw) = match &self.ws_url {
            Some(explicit) => ("ws_url", explicit.clone()),
            None => {
                let base = self.base_url()?;
                let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
                let rest = &base.as_str()[base.scheme().len()..];
                ("base_url", format!("{scheme}{}/ws", rest.trim_end_matches('/')))
            }
        };

        let url = Url::parse(&raw).map_err(|_| ConfigError::InvalidUrl {
            field,
            value: raw.clone(),
        })?;
        match url.scheme() {
            "ws" | "wss" => Ok(url),
            _ => Err(ConfigError::InvalidUrl { field, value: raw }),
        }
    }

    /// Check that every setting is usable.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        self.ws_url()?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout must be > 0".to_string()));
        }
        if self.update_buffer == 0 {
            return Err(ConfigError::Invalid("update_buffer must be > 0".to_string()));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(var)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { var, value })
        })
        .transpose()
}
