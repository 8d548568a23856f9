//! Translation configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Settings for form translation
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationConfig {
    /// Attempts per language (at least one is always made)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-call timeout forwarded to the transport
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Base delay for exponential backoff
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// What to return when some languages fail
    #[serde(default)]
    pub fallback_policy: TranslationFallbackPolicy,
}

/// Handling of a partially failed translation
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TranslationFallbackPolicy {
    /// Return the untranslated form
    #[default]
    ReturnOriginal,
    /// Merge the languages that did succeed
    MergeSuccessful,
}

impl TranslationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            timeout_ms: default_timeout_ms(),
            base_delay_ms: default_base_delay_ms(),
            fallback_policy: TranslationFallbackPolicy::default(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_base_delay_ms() -> u64 {
    1_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_defaults() {
        let config = TranslationConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.base_delay(), Duration::from_secs(1));
        assert_eq!(config.fallback_policy, TranslationFallbackPolicy::ReturnOriginal);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = TranslationConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
    }
}
