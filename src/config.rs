use std::{env, path::Path, time::Duration};

use dotenv::dotenv;
use thiserror::Error;

use crate::model::{constants::DEFAULT_FORM_WINDOW, policy::FieldStrengthPolicy};

pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value {value:?} for {name}")]
    InvalidValue { name: &'static str, value: String }
}

/// Settings for [`crate::service::RatingService`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Applied to every collaborator fetch, never to the numeric steps
    pub fetch_timeout: Duration,
    /// Rounds considered by the form rating
    pub form_window: usize,
    pub policy: FieldStrengthPolicy
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            form_window: DEFAULT_FORM_WINDOW,
            policy: FieldStrengthPolicy::default()
        }
    }
}

impl EngineConfig {
    /// Reads `RATING_FETCH_TIMEOUT_MS` and `RATING_FORM_WINDOW`, loading a `.env` file first
    /// if one exists. Unset variables fall back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let defaults = Self::default();

        Ok(Self {
            fetch_timeout: parse_var("RATING_FETCH_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.fetch_timeout),
            form_window: parse_var("RATING_FORM_WINDOW")?.unwrap_or(defaults.form_window),
            policy: defaults.policy
        })
    }

    pub fn with_policy(mut self, policy: FieldStrengthPolicy) -> Self {
        self.policy = policy;
        self
    }
}

pub fn load_policy(path: &Path) -> Result<FieldStrengthPolicy, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(FieldStrengthPolicy::from_json(&contents)?)
}

pub(crate) fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(None)
    }
}
