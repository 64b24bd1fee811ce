use serde::{Deserialize, Serialize};

use crate::config::{parse_var, ConfigError};

pub const DEFAULT_LIVE_FEED_CAPACITY: usize = 64;

/// Configuration for the live rating feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveFeedConfig {
    /// Updates buffered per player before the slowest subscriber starts losing the oldest ones
    pub capacity: usize,
    /// When false, subscribing and publishing fail with `PublisherError::Disabled`
    pub enabled: bool
}

impl LiveFeedConfig {
    /// Reads `LIVE_FEED_CAPACITY` and `LIVE_FEED_ENABLED`
    pub fn from_env() -> Result<Self, ConfigError> {
        let capacity = parse_var("LIVE_FEED_CAPACITY")?.unwrap_or(DEFAULT_LIVE_FEED_CAPACITY);
        if capacity == 0 {
            return Err(ConfigError::InvalidValue {
                name: "LIVE_FEED_CAPACITY",
                value: capacity.to_string()
            });
        }

        Ok(Self {
            capacity,
            enabled: parse_var("LIVE_FEED_ENABLED")?.unwrap_or(true)
        })
    }
}

impl Default for LiveFeedConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_LIVE_FEED_CAPACITY,
            enabled: true
        }
    }
}
