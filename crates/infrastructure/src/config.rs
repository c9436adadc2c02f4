//! Client configuration.
//!
//! Values come from an optional TOML file, then from `TRAPI__*`
//! environment variables (nested keys joined with `__`, e.g.
//! `TRAPI__CREDENTIALS__CLIENT_SECRET`). Anything unset keeps its default.

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use trapi_application::{ClientCredentials, DEFAULT_BASE_URL, DEFAULT_TOKEN_URL, RetryPolicy};
use url::Url;

use crate::adapters::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "TRAPI";

/// Largest accepted token expiry margin, one day.
pub const MAX_EXPIRY_MARGIN_SECS: i64 = 86_400;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or did not match the expected shape.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value was read but is not usable.
    #[error("invalid configuration value for {key}: {message}")]
    Invalid {
        /// Offending key.
        key: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// No client key and secret were configured.
    #[error("client credentials are not configured")]
    MissingCredentials,
}

/// Retry settings, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts per page, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay_ms: u64,
    /// Upper bound for any delay.
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
        }
    }
}

impl RetrySettings {
    /// Builds the policy the harvester applies.
    #[must_use]
    pub fn to_policy(self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

/// Client key and secret.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialSettings {
    /// Public client key.
    pub client_key: String,
    /// Client secret.
    #[serde(deserialize_with = "deserialize_secret")]
    pub client_secret: SecretString,
}

fn deserialize_secret<'de, D: Deserializer<'de>>(d: D) -> Result<SecretString, D::Error> {
    String::deserialize(d).map(SecretString::from)
}

/// Everything needed to talk to the research API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API base URL.
    pub base_url: String,
    /// Client-credentials token endpoint.
    pub token_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header.
    pub user_agent: String,
    /// Seconds subtracted from each token lifetime.
    pub expiry_margin_secs: i64,
    /// Retry settings for bulk collection.
    pub retry: RetrySettings,
    /// Client key and secret, if configured.
    pub credentials: Option<CredentialSettings>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            expiry_margin_secs: trapi_application::DEFAULT_EXPIRY_MARGIN_SECS,
            retry: RetrySettings::default(),
            credentials: None,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from `path` (if given) and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when the file is missing or malformed
    /// and [`ConfigError::Invalid`] when a value fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, environment())
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        builder = builder.add_source(env);
        Self::finish(builder.build()?)
    }

    /// Parses configuration from TOML text. The environment is not read.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::load`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?;
        Self::finish(config)
    }

    fn finish(config: Config) -> Result<Self, ConfigError> {
        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_url("base_url", &self.base_url)?;
        check_url("token_url", &self.token_url)?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "timeout_secs",
                message: "must be positive".to_string(),
            });
        }
        if !(0..=MAX_EXPIRY_MARGIN_SECS).contains(&self.expiry_margin_secs) {
            return Err(ConfigError::Invalid {
                key: "expiry_margin_secs",
                message: format!("must be between 0 and {MAX_EXPIRY_MARGIN_SECS}"),
            });
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "retry.max_attempts",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Token expiry margin.
    #[must_use]
    pub fn expiry_margin(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.expiry_margin_secs.clamp(0, MAX_EXPIRY_MARGIN_SECS))
    }

    /// Retry policy for bulk collection.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.to_policy()
    }

    /// Client credentials for the token exchange.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredentials`] when none are configured.
    pub fn client_credentials(&self) -> Result<ClientCredentials, ConfigError> {
        self.credentials
            .as_ref()
            .map(|c| ClientCredentials::new(c.client_key.clone(), c.client_secret.clone()))
            .ok_or(ConfigError::MissingCredentials)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
}

fn check_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::Invalid {
        key,
        message: format!("{e}: {value}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid {
            key,
            message: format!("unsupported scheme {other}"),
        }),
    }
}
