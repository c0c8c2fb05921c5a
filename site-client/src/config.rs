use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Upper bound for any configured interval or timeout.
pub const MAX_CONFIGURED_SECONDS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub leaderboard_url: String,
    pub kick_api_url: String,
    pub kick_channel: String,
    pub request_timeout: Duration,
    pub live_poll_interval: Duration,
    pub live_poll_max_backoff: Duration,
    pub guess_poll_interval: Duration,
    pub database_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let text = |key: &str, default: String| lookup(key).unwrap_or(default);
        let seconds = |key: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            match lookup(key) {
                Some(value) => {
                    let secs = parse::<u64>(key, &value)?;
                    if !(1..=MAX_CONFIGURED_SECONDS).contains(&secs) {
                        return Err(ConfigError::Invalid { key, value });
                    }
                    Ok(Duration::from_secs(secs))
                }
                None => Ok(default),
            }
        };

        Ok(Self {
            api_url: text("SITE_API_URL", defaults.api_url),
            leaderboard_url: text("LEADERBOARD_URL", defaults.leaderboard_url),
            kick_api_url: text("KICK_API_URL", defaults.kick_api_url),
            kick_channel: text("KICK_CHANNEL", defaults.kick_channel),
            request_timeout: seconds("REQUEST_TIMEOUT_SECONDS", defaults.request_timeout)?,
            live_poll_interval: seconds("LIVE_POLL_SECONDS", defaults.live_poll_interval)?,
            live_poll_max_backoff: seconds(
                "LIVE_POLL_MAX_BACKOFF_SECONDS",
                defaults.live_poll_max_backoff,
            )?,
            guess_poll_interval: seconds("GUESS_POLL_SECONDS", defaults.guess_poll_interval)?,
            database_url: text("DATABASE_URL", defaults.database_url),
        })
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "https://leroydata.onrender.com/api".to_string(),
            leaderboard_url: "https://leroydata.onrender.com/api/leaderboard".to_string(),
            kick_api_url: "https://kick.com/api/v2".to_string(),
            kick_channel: "leroyyjenderson".to_string(),
            request_timeout: Duration::from_secs(10),
            live_poll_interval: Duration::from_secs(60),
            live_poll_max_backoff: Duration::from_secs(600),
            guess_poll_interval: Duration::from_secs(20),
            database_url: site_persistence::connection::DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.live_poll_interval, Duration::from_secs(60));
        assert_eq!(config.kick_channel, "leroyyjenderson");
    }

    #[test]
    fn test_overrides_from_lookup() {
        let config = Config::from_lookup(lookup_from(&[
            ("SITE_API_URL", "http://localhost:3000/api"),
            ("REQUEST_TIMEOUT_SECONDS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:3000/api");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let result = Config::from_lookup(lookup_from(&[("LIVE_POLL_SECONDS", "soon")]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                key: "LIVE_POLL_SECONDS",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        for key in [
            "REQUEST_TIMEOUT_SECONDS",
            "LIVE_POLL_SECONDS",
            "LIVE_POLL_MAX_BACKOFF_SECONDS",
            "GUESS_POLL_SECONDS",
        ] {
            let result = Config::from_lookup(lookup_from(&[(key, "0")]));
            match result {
                Err(ConfigError::Invalid { key: reported, value }) => {
                    assert_eq!(reported, key);
                    assert_eq!(value, "0");
                }
                other => panic!("expected {} to be rejected, got {:?}", key, other),
            }
        }
    }

    #[test]
    fn test_oversized_duration_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[(
            "LIVE_POLL_MAX_BACKOFF_SECONDS",
            "18446744073709551615",
        )]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                key: "LIVE_POLL_MAX_BACKOFF_SECONDS",
                ..
            })
        ));

        let config = Config::from_lookup(lookup_from(&[("GUESS_POLL_SECONDS", "86400")])).unwrap();
        assert_eq!(config.guess_poll_interval, Duration::from_secs(MAX_CONFIGURED_SECONDS));
    }
}
