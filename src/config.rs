//! Process configuration read from the environment (and `.env` via `dotenv`).

use std::env;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_PREFIX: &str = "!";
const DEFAULT_REFRESH_SECS: u64 = 3600;

/// Errors raised while reading the configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Client credentials for the Spotify Web API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub discord_token: String,
    pub command_prefix: String,
    /// `None` disables Spotify link resolution.
    pub spotify: Option<SpotifyCredentials>,
    pub spotify_refresh_interval: Duration,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let discord_token = non_empty("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let command_prefix = lookup("COMMAND_PREFIX")
            .map(|prefix| prefix.trim().to_string())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let spotify = match (non_empty("SPOTIFY_CLIENT_ID"), non_empty("SPOTIFY_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(SpotifyCredentials {
                client_id,
                client_secret,
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("SPOTIFY_CLIENT_SECRET")),
            (None, Some(_)) => return Err(ConfigError::Missing("SPOTIFY_CLIENT_ID")),
        };

        let refresh_secs = match non_empty("SPOTIFY_TOKEN_REFRESH_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    key: "SPOTIFY_TOKEN_REFRESH_SECS",
                    reason: format!("expected a positive number of seconds, got {:?}", raw),
                })?,
            None => DEFAULT_REFRESH_SECS,
        };

        Ok(Self {
            discord_token,
            command_prefix,
            spotify,
            spotify_refresh_interval: Duration::from_secs(refresh_secs),
        })
    }
}
