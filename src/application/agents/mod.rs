//! Agents - single-purpose wrappers around one model call each.
//!
//! Every agent validates the model's reply field by field and substitutes a
//! deterministic fallback when the call or the reply is unusable, so callers
//! always receive a value.
//!
//! - `PromptAnalysisAgent` - is the prompt detailed enough?
//! - `QuestionGenerationAgent` - which clarifying questions to ask
//! - `MultiLanguageDetectionAgent` - does the user want several languages?
//! - `TranslationGenerationAgent` - translate the generated form

mod base;
mod errors;
mod language_detection;
mod prompt_analysis;
mod question_generation;
mod translation;

pub use base::{
    extract_json, measure_execution_time, parse_json_response, require_array, require_boolean,
    require_fields, require_number_in_range, require_string, retry_with_backoff, try_parse_json,
    BaseAgent, Timed,
};
pub use errors::{AgentError, AgentOutcome};
pub use language_detection::MultiLanguageDetectionAgent;
pub use prompt_analysis::PromptAnalysisAgent;
pub use question_generation::{generate_fallback_questions, QuestionGenerationAgent};
pub use translation::TranslationGenerationAgent;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::ports::{AIProvider, ApiConfigSource};

/// The four agents a conversation uses, sharing one provider.
#[derive(Clone)]
pub struct AgentSet {
    pub analysis: PromptAnalysisAgent,
    pub questions: QuestionGenerationAgent,
    pub language: MultiLanguageDetectionAgent,
    pub translation: TranslationGenerationAgent,
}

impl AgentSet {
    /// Builds every agent from the application configuration.
    pub fn new(
        provider: Arc<dyn AIProvider>,
        api_source: Arc<dyn ApiConfigSource>,
        config: &AppConfig,
    ) -> Self {
        let timeout = config.ai.timeout();

        Self {
            analysis: PromptAnalysisAgent::from_base(
                BaseAgent::new(PromptAnalysisAgent::NAME, provider.clone(), api_source.clone())
                    .with_temperature(0.3)
                    .with_timeout(timeout),
            ),
            questions: QuestionGenerationAgent::from_base(
                BaseAgent::new(QuestionGenerationAgent::NAME, provider.clone(), api_source.clone())
                    .with_temperature(0.5)
                    .with_timeout(timeout),
            )
            .with_limits(config.conversation.history_window, config.conversation.max_questions),
            language: MultiLanguageDetectionAgent::from_base(
                BaseAgent::new(MultiLanguageDetectionAgent::NAME, provider.clone(), api_source.clone())
                    .with_temperature(0.1)
                    .with_timeout(timeout),
                config.language_detection.clone(),
            ),
            translation: TranslationGenerationAgent::new(
                provider,
                api_source,
                config.translation.clone(),
            ),
        }
    }
}
