//! Client configuration loaded from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `PAWCACHE_API_URL` | `http://localhost:8080/api` |
//! | `PAWCACHE_SESSION_PATH` | `session.json` |
//! | `PAWCACHE_TIMEOUT_MS` | `10000` |
//! | `PAWCACHE_MAPS_KEY` | unset |

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

pub const API_URL: &str = "PAWCACHE_API_URL";
pub const SESSION_PATH: &str = "PAWCACHE_SESSION_PATH";
pub const TIMEOUT_MS: &str = "PAWCACHE_TIMEOUT_MS";
pub const MAPS_KEY: &str = "PAWCACHE_MAPS_KEY";

const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_SESSION_PATH: &str = "session.json";
const DEFAULT_TIMEOUT_MS: &str = "10000";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Reverse-proxied API base URL all service paths are joined onto.
    pub base_url: String,
    /// Where the persisted auth session lives.
    pub session_path: PathBuf,
    pub timeout: Duration,
    /// Third-party maps SDK key, passed through to the embedding app.
    pub maps_sdk_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            session_path: PathBuf::from(DEFAULT_SESSION_PATH),
            timeout: Duration::from_millis(10_000),
            maps_sdk_key: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from any key lookup (the environment, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url: String = load(&lookup, API_URL, DEFAULT_API_URL)?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: API_URL,
                value: base_url,
                reason: "expected an http(s) URL".into(),
            });
        }

        let session_path: PathBuf = load(&lookup, SESSION_PATH, DEFAULT_SESSION_PATH)?;
        let timeout_ms: u64 = load(&lookup, TIMEOUT_MS, DEFAULT_TIMEOUT_MS)?;
        let maps_sdk_key = lookup(MAPS_KEY).filter(|k| !k.trim().is_empty());
        if maps_sdk_key.is_none() {
            warn!("{MAPS_KEY} not set, map views will be disabled");
        }

        Ok(Self {
            base_url,
            session_path,
            timeout: Duration::from_millis(timeout_ms),
            maps_sdk_key,
        })
    }
}

fn load<T, F>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }
    })
}
