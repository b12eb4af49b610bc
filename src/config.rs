//! Application configuration.
//!
//! The Strava application credentials (client id and secret) are read from
//! the process environment exactly once at startup and carried in an explicit
//! `Config` value - nothing deeper in the call tree touches the environment.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::auth::{AuthStrategy, TokenStore};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Strava API application id
    pub client_id: i64,
    /// Strava API application secret
    pub client_secret: String,
    /// How the authorization code is obtained when a full re-auth is needed
    pub auth_strategy: AuthStrategy,
    /// Optional upper bound on the callback listener wait
    pub listen_timeout: Option<Duration>,
    /// Location of the persisted credential file
    pub token_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let client_id = required("STRAVA_CLIENT_ID")?;
        let client_id = client_id
            .parse::<i64>()
            .map_err(|e| ConfigError::Invalid {
                name: "STRAVA_CLIENT_ID",
                value: client_id,
                reason: e.to_string(),
            })?;

        let client_secret = required("STRAVA_CLIENT_SECRET")?;

        let auth_strategy = match std::env::var("STRAVA_AUTH_STRATEGY") {
            Ok(value) => match value.to_ascii_lowercase().as_str() {
                "browser" => AuthStrategy::Browser,
                "manual" => AuthStrategy::Manual,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "STRAVA_AUTH_STRATEGY",
                        value,
                        reason: "expected \"browser\" or \"manual\"".to_string(),
                    })
                }
            },
            Err(_) => AuthStrategy::Browser,
        };

        let listen_timeout = match std::env::var("STRAVA_AUTH_TIMEOUT_SECS") {
            Ok(value) => {
                let secs = value.parse::<u64>().map_err(|e| ConfigError::Invalid {
                    name: "STRAVA_AUTH_TIMEOUT_SECS",
                    value,
                    reason: e.to_string(),
                })?;
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        Ok(Self {
            client_id,
            client_secret,
            auth_strategy,
            listen_timeout,
            token_path: TokenStore::default_path(),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing(name))
}
