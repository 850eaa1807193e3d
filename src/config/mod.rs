mod error;


pub use error::ConfigError;

use crate::batcher::{Batcher, DEFAULT_RECIPIENT_LIMIT};
use std::time::Duration;

pub const DEFAULT_FROM: &str = "\"Bulkmail\" <noreply@example.com>";
pub const DEFAULT_DATABASE: &str = "bulkmail.db";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Relay credentials, sender identity and batching limits
#[derive(Debug, Clone)]
pub struct Config {
    pub relay_url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
    pub recipient_limit: usize,
    pub database_path: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relay_url: None,
            api_key: None,
            from: DEFAULT_FROM.to_string(),
            recipient_limit: DEFAULT_RECIPIENT_LIMIT,
            database_path: DEFAULT_DATABASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Read `BULKMAIL_*` variables, loading a `.env` file first if present
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_limit(None)
    }

    /// Like `from_env`, but a given limit (e.g. a CLI flag) replaces
    /// `BULKMAIL_RECIPIENT_LIMIT`, which is then never read
    pub fn from_env_with_limit(recipient_limit: Option<i64>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup_with_limit(|name| std::env::var(name).ok(), recipient_limit)
    }

    /// Build from any variable lookup; `from_env` passes the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup_with_limit(lookup, None)
    }

    pub fn from_lookup_with_limit<F>(
        lookup: F,
        recipient_limit: Option<i64>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let env_limit = match recipient_limit {
            Some(_) => None,
            None => lookup("BULKMAIL_RECIPIENT_LIMIT"),
        };

        let recipient_limit = match (recipient_limit, env_limit) {
            (Some(limit), _) => Batcher::from_signed(limit)?.recipient_limit(),
            (None, Some(raw)) => {
                let signed: i64 = raw.trim().parse().map_err(|_| ConfigError::InvalidEnvVar {
                    name: "BULKMAIL_RECIPIENT_LIMIT".to_string(),
                    value: raw.clone(),
                })?;
                Batcher::from_signed(signed)?.recipient_limit()
            }
            (None, None) => defaults.recipient_limit,
        };

        let timeout = match lookup("BULKMAIL_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidEnvVar {
                    name: "BULKMAIL_TIMEOUT_SECS".to_string(),
                    value: raw.clone(),
                })?;
                Duration::from_secs(secs)
            }
            None => defaults.timeout,
        };

        Ok(Self {
            relay_url: lookup("BULKMAIL_RELAY_URL").filter(|v| !v.trim().is_empty()),
            api_key: lookup("BULKMAIL_API_KEY").filter(|v| !v.trim().is_empty()),
            from: lookup("BULKMAIL_FROM").unwrap_or(defaults.from),
            recipient_limit,
            database_path: lookup("BULKMAIL_DATABASE").unwrap_or(defaults.database_path),
            timeout,
        })
    }

    /// Relay URL, required before anything can be sent
    pub fn relay_url(&self) -> Result<&str, ConfigError> {
        self.relay_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("BULKMAIL_RELAY_URL".to_string()))
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("BULKMAIL_API_KEY".to_string()))
    }

    pub fn batcher(&self) -> Result<Batcher, ConfigError> {
        Batcher::new(self.recipient_limit)
    }
}
