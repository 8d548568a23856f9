//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `FORMCRAFT` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use formcraft::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Using model {}", config.ai.model);
//! ```

mod ai;
mod conversation;
mod error;
mod language;
mod translation;

pub use ai::{AiConfig, AiProvider};
pub use conversation::ConversationConfig;
pub use error::{ConfigError, ValidationError};
pub use language::LanguageDetectionConfig;
pub use translation::{TranslationConfig, TranslationFallbackPolicy};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable
/// configuration apart from the API key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Model endpoint
    #[serde(default)]
    pub ai: AiConfig,

    /// Multi-language detection
    #[serde(default)]
    pub language_detection: LanguageDetectionConfig,

    /// Form translation
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Clarifying-question loop
    #[serde(default)]
    pub conversation: ConversationConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `FORMCRAFT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `FORMCRAFT__AI__API_KEY=sk-...` -> `ai.api_key = sk-...`
    /// - `FORMCRAFT__TRANSLATION__MAX_RETRIES=5` -> `translation.max_retries = 5`
    /// - `FORMCRAFT__LANGUAGE_DETECTION__SUPPORTED_LANGUAGES=en,es,fr` -> list
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("FORMCRAFT")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("language_detection.supported_languages"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.language_detection.validate()?;
        self.translation.validate()?;
        self.conversation.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("FORMCRAFT__AI__API_KEY");
        env::remove_var("FORMCRAFT__AI__MODEL");
        env::remove_var("FORMCRAFT__AI__PROVIDER");
        env::remove_var("FORMCRAFT__TRANSLATION__MAX_RETRIES");
        env::remove_var("FORMCRAFT__TRANSLATION__FALLBACK_POLICY");
        env::remove_var("FORMCRAFT__LANGUAGE_DETECTION__SUPPORTED_LANGUAGES");
        env::remove_var("FORMCRAFT__CONVERSATION__MAX_ROUNDS");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("FORMCRAFT__AI__API_KEY", "sk-test");
        env::set_var("FORMCRAFT__AI__MODEL", "gpt-4o");
        env::set_var("FORMCRAFT__TRANSLATION__MAX_RETRIES", "5");
        env::set_var("FORMCRAFT__TRANSLATION__FALLBACK_POLICY", "merge_successful");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.ai.model, "gpt-4o");
        assert_eq!(config.translation.max_retries, 5);
        assert_eq!(
            config.translation.fallback_policy,
            TranslationFallbackPolicy::MergeSuccessful
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.conversation.max_rounds, 5);
        assert_eq!(config.language_detection.default_language, "en");
        assert_eq!(config.translation.timeout_ms, 30_000);
    }

    #[test]
    fn test_supported_languages_list() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("FORMCRAFT__LANGUAGE_DETECTION__SUPPORTED_LANGUAGES", "en,es,fr");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.language_detection.supported_languages,
            vec!["en", "es", "fr"]
        );
    }

    #[test]
    fn test_mock_provider_validates_without_key() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("FORMCRAFT__AI__PROVIDER", "mock");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.provider, AiProvider::Mock);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_key_for_openai() {
        let config = AppConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }
}
