//! services/companion/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use dish_companion_core::TurnTiming;
use std::time::Duration;
use tracing::Level;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_RECOGNIZE_PATH: &str = "/api/recognize-dish";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: Url,
    pub recognize_path: String,
    pub request_timeout: Duration,
    pub log_level: Level,
    pub user_id: Option<String>,
    pub location: Option<String>,
    /// Answer from the local reply table instead of the backend.
    pub offline: bool,
    pub turn_timing: TurnTiming,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source. Unset variables fall
    /// back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Backend Settings ---
        let raw_base_url = lookup("API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_base_url = parse_base_url(&raw_base_url)
            .map_err(|e| ConfigError::InvalidValue("API_BASE_URL".to_string(), e))?;

        let recognize_path = lookup("RECOGNIZE_DISH_PATH")
            .unwrap_or_else(|| DEFAULT_RECOGNIZE_PATH.to_string());
        if !recognize_path.starts_with('/') {
            return Err(ConfigError::InvalidValue(
                "RECOGNIZE_DISH_PATH".to_string(),
                format!("'{}' must start with '/'", recognize_path),
            ));
        }

        let request_timeout = millis_var(&lookup, "REQUEST_TIMEOUT_MS", DEFAULT_TIMEOUT)?;
        if request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "REQUEST_TIMEOUT_MS".to_string(),
                "the timeout must be greater than zero".to_string(),
            ));
        }

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Conversation Settings ---
        let user_id = lookup("COMPANION_USER_ID").filter(|v| !v.trim().is_empty());
        let location = lookup("COMPANION_LOCATION").filter(|v| !v.trim().is_empty());
        let offline = match lookup("COMPANION_OFFLINE") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "COMPANION_OFFLINE".to_string(),
                    format!("'{}' is not a boolean", raw),
                )
            })?,
            None => false,
        };

        let timing = TurnTiming::default();
        let turn_timing = TurnTiming {
            dish_image: millis_var(&lookup, "TURN_DISH_IMAGE_DELAY_MS", timing.dish_image)?,
            intro: millis_var(&lookup, "TURN_INTRO_DELAY_MS", timing.intro)?,
            restaurant: millis_var(&lookup, "TURN_RESTAURANT_DELAY_MS", timing.restaurant)?,
            canned: millis_var(&lookup, "TURN_CANNED_DELAY_MS", timing.canned)?,
        };

        Ok(Self {
            api_base_url,
            recognize_path,
            request_timeout,
            log_level,
            user_id,
            location,
            offline,
            turn_timing,
        })
    }
}

/// Only absolute http(s) addresses are accepted as a backend base.
pub fn parse_base_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}

fn millis_var<F>(lookup: &F, name: &str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        None => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.recognize_path, DEFAULT_RECOGNIZE_PATH);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.log_level, Level::INFO);
        assert!(!config.offline);
        assert_eq!(config.turn_timing, TurnTiming::default());
    }

    #[test]
    fn values_are_read_from_the_environment() {
        let config = Config::from_lookup(lookup_from(&[
            ("API_BASE_URL", "https://woltie.example.com"),
            ("RECOGNIZE_DISH_PATH", "/api/suggest-dish"),
            ("REQUEST_TIMEOUT_MS", "2500"),
            ("RUST_LOG", "debug"),
            ("COMPANION_LOCATION", "Helsinki"),
            ("COMPANION_OFFLINE", "yes"),
            ("TURN_RESTAURANT_DELAY_MS", "10"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url.host_str(), Some("woltie.example.com"));
        assert_eq!(config.recognize_path, "/api/suggest-dish");
        assert_eq!(config.request_timeout, Duration::from_millis(2500));
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.location.as_deref(), Some("Helsinki"));
        assert!(config.offline);
        assert_eq!(config.turn_timing.restaurant, Duration::from_millis(10));
    }

    #[test]
    fn invalid_values_are_reported() {
        for pairs in [
            [("REQUEST_TIMEOUT_MS", "0")],
            [("REQUEST_TIMEOUT_MS", "soon")],
            [("API_BASE_URL", "ftp://files.example.com")],
            [("API_BASE_URL", "not a url")],
            [("RECOGNIZE_DISH_PATH", "api/recognize")],
            [("COMPANION_OFFLINE", "maybe")],
            [("RUST_LOG", "loud")],
        ] {
            let result = Config::from_lookup(lookup_from(&pairs));
            assert!(
                matches!(result, Err(ConfigError::InvalidValue(ref name, _)) if name == pairs[0].0),
                "{pairs:?} -> {result:?}"
            );
        }
    }
}
