//! Language detection configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::language::DEFAULT_SUPPORTED_LANGUAGES;

/// Settings for multi-language request detection
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageDetectionConfig {
    /// Minimum confidence for a multi-language claim to count
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Upper bound on requested languages
    #[serde(default = "default_max_languages")]
    pub max_languages: usize,

    /// Allow-list of ISO-639-1 codes
    #[serde(default = "default_supported_languages")]
    pub supported_languages: Vec<String>,

    /// Language used when nothing else is requested
    #[serde(default = "default_language")]
    pub default_language: String,
}

impl LanguageDetectionConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ValidationError::InvalidThreshold(
                "language_detection.confidence_threshold",
            ));
        }
        if self.max_languages == 0 {
            return Err(ValidationError::InvalidLimit("language_detection.max_languages"));
        }
        if !self
            .supported_languages
            .iter()
            .any(|code| code.eq_ignore_ascii_case(&self.default_language))
        {
            return Err(ValidationError::UnsupportedDefaultLanguage(
                self.default_language.clone(),
            ));
        }
        Ok(())
    }
}

impl Default for LanguageDetectionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            max_languages: default_max_languages(),
            supported_languages: default_supported_languages(),
            default_language: default_language(),
        }
    }
}

fn default_confidence_threshold() -> f64 {
    0.7
}

fn default_max_languages() -> usize {
    5
}

fn default_supported_languages() -> Vec<String> {
    DEFAULT_SUPPORTED_LANGUAGES
        .iter()
        .map(|code| code.to_string())
        .collect()
}

fn default_language() -> String {
    "en".to_string()
}
