//! Prompt completeness analysis.

use serde_json::Value;
use std::sync::Arc;

use super::base::{require_boolean, try_parse_json, BaseAgent};
use super::errors::{AgentError, AgentOutcome};
use crate::domain::conversation::{categories, PromptAnalysis};
use crate::domain::foundation::ValidationError;
use crate::ports::{AIProvider, ApiConfigSource};

const SYSTEM_PROMPT: &str = "You are a form design analyst. Decide whether a request \
describes a form in enough detail to build it. Respond with JSON only, shaped as \
{\"isComplete\": boolean, \"missingCategories\": string[], \"confidence\": number between 0 and 1, \
\"reasoning\": string, \"suggestedQuestions\": string[]}. Use the categories form_purpose, \
required_fields and validation_rules.";

const DEFAULT_CONFIDENCE: f64 = 0.5;
const DEFAULT_REASONING: &str = "No reasoning provided";

/// Judges whether a prompt is detailed enough to generate a form.
#[derive(Clone)]
pub struct PromptAnalysisAgent {
    base: BaseAgent,
}

impl PromptAnalysisAgent {
    pub const NAME: &'static str = "PromptAnalysisAgent";

    pub fn new(provider: Arc<dyn AIProvider>, api_source: Arc<dyn ApiConfigSource>) -> Self {
        Self::from_base(BaseAgent::new(Self::NAME, provider, api_source).with_temperature(0.3))
    }

    pub fn from_base(base: BaseAgent) -> Self {
        Self { base }
    }

    /// Analyzes `prompt`. Never fails; degraded answers come back as
    /// [`AgentOutcome::Fallback`].
    pub async fn analyze_prompt(&self, prompt: &str) -> AgentOutcome<PromptAnalysis> {
        let user_prompt = format!(
            "Analyze this form request and report what is still missing.\n\nRequest:\n{}",
            prompt
        );

        let raw = match self.base.invoke(&user_prompt, Some(SYSTEM_PROMPT), None).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(agent = Self::NAME, error = %e, "analysis unavailable, using fallback");
                return AgentOutcome::fallback(unavailable_analysis(&e), e.to_string());
            }
        };

        match try_parse_json(&raw).and_then(|value| interpret(&value).map_err(AgentError::from)) {
            Ok(analysis) => AgentOutcome::Validated(analysis),
            Err(e) => {
                tracing::info!(agent = Self::NAME, error = %e, "unstructured analysis, applying heuristic");
                AgentOutcome::fallback(heuristic_analysis(&raw), e.to_string())
            }
        }
    }
}

fn interpret(value: &Value) -> Result<PromptAnalysis, ValidationError> {
    let is_complete = require_boolean(value, "isComplete")?;

    let confidence = value
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_CONFIDENCE);

    let reasoning = value
        .get("reasoning")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_REASONING);

    Ok(
        PromptAnalysis::new(
            is_complete,
            string_list(value.get("missingCategories")),
            confidence,
            reasoning,
        )
        .with_suggested_questions(string_list(value.get("suggestedQuestions"))),
    )
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Reads completeness out of free text when the reply is not usable JSON.
fn heuristic_analysis(raw: &str) -> PromptAnalysis {
    let text = raw.to_lowercase();
    let is_complete = text.contains("complete")
        && !text.contains("not complete")
        && !text.contains("incomplete");

    if is_complete {
        return PromptAnalysis::new(true, Vec::new(), 0.7, "Inferred from an unstructured response");
    }

    let mut missing: Vec<String> = [
        ("purpose", categories::FORM_PURPOSE),
        ("field", categories::REQUIRED_FIELDS),
        ("validation", categories::VALIDATION_RULES),
    ]
    .iter()
    .filter(|(keyword, _)| text.contains(keyword))
    .map(|(_, category)| category.to_string())
    .collect();

    if missing.is_empty() {
        missing = default_missing();
    }

    PromptAnalysis::new(false, missing, 0.3, "Inferred from an unstructured response")
}

fn unavailable_analysis(error: &AgentError) -> PromptAnalysis {
    PromptAnalysis::new(
        false,
        default_missing(),
        0.1,
        format!("Analysis unavailable: {}", error),
    )
    .with_suggested_questions(vec![
        "What is the main purpose of this form?".to_string(),
        "What information do you need to collect?".to_string(),
    ])
}

fn default_missing() -> Vec<String> {
    vec![
        categories::FORM_PURPOSE.to_string(),
        categories::REQUIRED_FIELDS.to_string(),
    ]
}
