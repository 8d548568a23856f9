//! In-memory API configuration source.
//!
//! Holds the active `ApiConfig` and lets a settings layer swap it at runtime.
//! Agents read a fresh copy on every call, so a replaced key takes effect on
//! the next request.

use std::sync::Mutex;

use crate::ports::{ApiConfig, ApiConfigSource};

/// In-memory implementation of the `ApiConfigSource` port.
///
/// Thread-safe via internal `Mutex`.
pub struct StaticApiConfigSource {
    config: Mutex<ApiConfig>,
}

impl StaticApiConfigSource {
    /// Creates a source serving `config`.
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config: Mutex::new(config),
        }
    }

    /// Replaces the active configuration.
    pub fn replace(&self, config: ApiConfig) {
        match self.config.lock() {
            Ok(mut current) => *current = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
    }
}

impl ApiConfigSource for StaticApiConfigSource {
    fn api_config(&self) -> ApiConfig {
        match self.config.lock() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_configured_value() {
        let source = StaticApiConfigSource::new(
            ApiConfig::new("openai", "https://api.openai.com/v1", "gpt-4o-mini").with_api_key("k"),
        );

        let config = source.api_config();
        assert_eq!(config.name, "openai");
        assert!(config.has_credentials());
    }

    #[test]
    fn replace_takes_effect_on_next_read() {
        let source = StaticApiConfigSource::new(ApiConfig::new("a", "http://a", "m"));
        assert!(!source.api_config().has_credentials());

        source.replace(ApiConfig::new("b", "http://b", "m").with_api_key("new-key"));

        let config = source.api_config();
        assert_eq!(config.name, "b");
        assert_eq!(config.api_key(), Some("new-key"));
    }
}
