//! Multi-language request detection.

use serde_json::Value;
use std::sync::Arc;

use super::base::{require_array, require_boolean, try_parse_json, BaseAgent};
use super::errors::{AgentError, AgentOutcome};
use crate::config::LanguageDetectionConfig;
use crate::domain::conversation::clamp_unit;
use crate::domain::foundation::ValidationError;
use crate::domain::language::{get_language_details, validate_language_codes, MultiLanguageAnalysis};
use crate::ports::{AIProvider, ApiConfigSource};

const SYSTEM_PROMPT: &str = "You detect whether a user wants a form available in more \
than one language. Respond with JSON only, shaped as {\"isMultiLanguageRequested\": boolean, \
\"requestedLanguages\": string[] of ISO-639-1 codes, \"confidence\": number between 0 and 1, \
\"reasoning\": string}.";

/// Detects whether a prompt asks for a multi-language form.
#[derive(Clone)]
pub struct MultiLanguageDetectionAgent {
    base: BaseAgent,
    config: LanguageDetectionConfig,
}

impl MultiLanguageDetectionAgent {
    pub const NAME: &'static str = "MultiLanguageDetectionAgent";

    pub fn new(
        provider: Arc<dyn AIProvider>,
        api_source: Arc<dyn ApiConfigSource>,
        config: LanguageDetectionConfig,
    ) -> Self {
        Self::from_base(
            BaseAgent::new(Self::NAME, provider, api_source).with_temperature(0.1),
            config,
        )
    }

    pub fn from_base(base: BaseAgent, config: LanguageDetectionConfig) -> Self {
        Self { base, config }
    }

    pub fn config(&self) -> &LanguageDetectionConfig {
        &self.config
    }

    pub async fn detect_multi_language_request(&self, prompt: &str) -> AgentOutcome<MultiLanguageAnalysis> {
        let user_prompt = format!(
            "Supported language codes: {}\nAt most {} languages may be requested.\n\nRequest:\n{}",
            self.config.supported_languages.join(", "),
            self.config.max_languages,
            prompt
        );

        let result = match self.base.invoke(&user_prompt, Some(SYSTEM_PROMPT), None).await {
            Ok(raw) => try_parse_json(&raw).and_then(|value| self.interpret(&value).map_err(AgentError::from)),
            Err(e) => Err(e),
        };

        match result {
            Ok(analysis) => {
                tracing::debug!(
                    agent = Self::NAME,
                    requested = analysis.is_multi_language_requested,
                    languages = ?analysis.requested_languages,
                    "language detection finished"
                );
                AgentOutcome::Validated(analysis)
            }
            Err(e) => {
                tracing::warn!(agent = Self::NAME, error = %e, "language detection failed, assuming single language");
                AgentOutcome::fallback(
                    MultiLanguageAnalysis::single_language(
                        &self.config.default_language,
                        0.0,
                        format!("Language detection failed: {}", e),
                    ),
                    e.to_string(),
                )
            }
        }
    }

    fn interpret(&self, value: &Value) -> Result<MultiLanguageAnalysis, ValidationError> {
        let claimed = require_boolean(value, "isMultiLanguageRequested")?;
        let raw_codes: Vec<String> = require_array(value, "requestedLanguages")?
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();

        let confidence = clamp_unit(value.get("confidence").and_then(Value::as_f64).unwrap_or(0.0));
        let reasoning = value
            .get("reasoning")
            .and_then(Value::as_str)
            .unwrap_or("No reasoning provided")
            .to_string();

        let codes = validate_language_codes(
            &raw_codes,
            &self.config.supported_languages,
            self.config.max_languages,
        );

        let is_requested = claimed && !codes.is_empty() && confidence >= self.config.confidence_threshold;

        let (requested_languages, suggested_languages) = if is_requested {
            (codes, Vec::new())
        } else {
            (vec![self.config.default_language.clone()], codes)
        };

        Ok(MultiLanguageAnalysis {
            is_multi_language_requested: is_requested,
            language_details: get_language_details(&requested_languages),
            requested_languages,
            confidence,
            reasoning,
            suggested_languages,
        })
    }
}
