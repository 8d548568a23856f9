//! Clarifying question generation.

use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

use super::base::{try_parse_json, BaseAgent};
use super::errors::{AgentError, AgentOutcome};
use crate::domain::conversation::{categories, AgentQuestion, ConversationMessage, InputType, PromptAnalysis};
use crate::ports::{AIProvider, ApiConfigSource};

const SYSTEM_PROMPT: &str = "You help users describe the form they need. Ask short, \
specific clarifying questions about the missing information. Respond with a JSON array \
only. Each element is {\"id\": string, \"question\": string, \"category\": string, \
\"inputType\": \"text\" | \"textarea\" | \"select\" | \"multiselect\", \"options\": string[] \
(required for select and multiselect), \"required\": boolean, \"placeholder\": string, \
\"helpText\": string}.";

const DEFAULT_HISTORY_WINDOW: usize = 6;
const DEFAULT_MAX_QUESTIONS: usize = 5;

/// Produces typed follow-up questions for the gaps an analysis found.
#[derive(Clone)]
pub struct QuestionGenerationAgent {
    base: BaseAgent,
    history_window: usize,
    max_questions: usize,
}

impl QuestionGenerationAgent {
    pub const NAME: &'static str = "QuestionGenerationAgent";

    pub fn new(provider: Arc<dyn AIProvider>, api_source: Arc<dyn ApiConfigSource>) -> Self {
        Self::from_base(BaseAgent::new(Self::NAME, provider, api_source).with_temperature(0.5))
    }

    pub fn from_base(base: BaseAgent) -> Self {
        Self {
            base,
            history_window: DEFAULT_HISTORY_WINDOW,
            max_questions: DEFAULT_MAX_QUESTIONS,
        }
    }

    /// Sets how many recent messages go into the prompt and how many
    /// questions are kept.
    pub fn with_limits(mut self, history_window: usize, max_questions: usize) -> Self {
        self.history_window = history_window;
        self.max_questions = max_questions.max(1);
        self
    }

    pub async fn generate_questions(
        &self,
        analysis: &PromptAnalysis,
        history: &[ConversationMessage],
    ) -> AgentOutcome<Vec<AgentQuestion>> {
        let prompt = self.build_prompt(analysis, history);

        let raw = match self.base.invoke(&prompt, Some(SYSTEM_PROMPT), None).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(agent = Self::NAME, error = %e, "question generation unavailable");
                return AgentOutcome::fallback(generate_fallback_questions(analysis), e.to_string());
            }
        };

        match self.interpret(&raw) {
            Ok(questions) => AgentOutcome::Validated(questions),
            Err(e) => {
                let mut questions = questions_from_text(&raw, analysis);
                if questions.is_empty() {
                    questions = generate_fallback_questions(analysis);
                }
                questions.truncate(self.max_questions);
                tracing::info!(
                    agent = Self::NAME,
                    error = %e,
                    count = questions.len(),
                    "unusable question list, using fallback questions"
                );
                AgentOutcome::fallback(questions, e.to_string())
            }
        }
    }

    fn build_prompt(&self, analysis: &PromptAnalysis, history: &[ConversationMessage]) -> String {
        let start = history.len().saturating_sub(self.history_window);
        let transcript: Vec<String> = history[start..]
            .iter()
            .map(|m| format!("{}: {}", m.message_type().label(), m.content()))
            .collect();

        let mut prompt = format!(
            "Analysis: {}\nMissing categories: {}\n",
            analysis.summary(),
            analysis.missing_categories.join(", ")
        );
        if !analysis.suggested_questions.is_empty() {
            prompt.push_str(&format!(
                "Suggested questions: {}\n",
                analysis.suggested_questions.join(" | ")
            ));
        }
        prompt.push_str(&format!(
            "\nRecent conversation:\n{}\n\nAsk at most {} questions.",
            transcript.join("\n"),
            self.max_questions
        ));
        prompt
    }

    fn interpret(&self, raw: &str) -> Result<Vec<AgentQuestion>, AgentError> {
        let value = try_parse_json(raw)?;
        let items = match &value {
            Value::Array(items) => items,
            Value::Object(map) => map
                .get("questions")
                .and_then(Value::as_array)
                .ok_or_else(|| AgentError::Parse("expected an array of questions".to_string()))?,
            _ => return Err(AgentError::Parse("expected an array of questions".to_string())),
        };

        let questions = normalize_questions(items, self.max_questions);
        if questions.is_empty() && !items.is_empty() {
            return Err(AgentError::Parse("no usable questions in response".to_string()));
        }
        Ok(questions)
    }
}

/// Coerces model-supplied question objects into well-formed questions.
fn normalize_questions(items: &[Value], max_questions: usize) -> Vec<AgentQuestion> {
    let mut seen = HashSet::new();

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| normalize_question(item, index))
        .filter(|q| seen.insert(q.id.clone()))
        .take(max_questions)
        .collect()
}

fn normalize_question(item: &Value, index: usize) -> Option<AgentQuestion> {
    let text = non_empty_str(item.get("question"))?;
    let category = non_empty_str(item.get("category")).unwrap_or("general");
    let id = non_empty_str(item.get("id"))
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}_{}", category, index + 1));

    let mut input_type = item
        .get("inputType")
        .and_then(Value::as_str)
        .and_then(InputType::parse)
        .unwrap_or_default();

    let options: Vec<String> = item
        .get("options")
        .and_then(Value::as_array)
        .map(|opts| {
            opts.iter()
                .filter_map(|o| non_empty_str(Some(o)))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if input_type.requires_options() && options.is_empty() {
        input_type = InputType::Text;
    }

    let required = item.get("required").is_some_and(is_truthy);
    let placeholder = non_empty_str(item.get("placeholder"))
        .map(str::to_string)
        .unwrap_or_else(|| default_placeholder(input_type).to_string());
    let help_text = non_empty_str(item.get("helpText"))
        .map(str::to_string)
        .unwrap_or_else(|| default_help_text(category));

    let mut question = AgentQuestion::new(id, text, category)
        .with_input_type(input_type)
        .with_required(required)
        .with_placeholder(placeholder)
        .with_help_text(help_text);
    if input_type.requires_options() {
        question = question.with_options(options);
    }
    Some(question)
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Loose truthiness: `false`, `0`, `""` and `null` are false, as is an
/// absent value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn default_placeholder(input_type: InputType) -> &'static str {
    match input_type {
        InputType::Text => "Enter your answer...",
        InputType::Textarea => "Please provide details...",
        InputType::Select => "Select an option",
        InputType::Multiselect => "Select all that apply",
    }
}

fn default_help_text(category: &str) -> String {
    format!("This helps define the form's {}", category.replace('_', " "))
}

/// Picks question lines out of a free-text reply.
fn questions_from_text(raw: &str, analysis: &PromptAnalysis) -> Vec<AgentQuestion> {
    let category = analysis
        .missing_categories
        .first()
        .map(String::as_str)
        .unwrap_or("general");

    raw.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| c.is_ascii_digit() || matches!(c, '-' | '*' | '.' | ')'))
                .trim()
        })
        .filter(|line| line.ends_with('?') && line.len() > 5)
        .enumerate()
        .map(|(index, line)| {
            AgentQuestion::new(format!("question_{}", index + 1), line, category)
                .with_input_type(InputType::Textarea)
                .with_placeholder(default_placeholder(InputType::Textarea))
                .with_help_text(default_help_text(category))
        })
        .collect()
}

/// Canned questions, one per recognized missing category in order.
///
/// Falls back to a single catch-all question when no category is recognized.
pub fn generate_fallback_questions(analysis: &PromptAnalysis) -> Vec<AgentQuestion> {
    let questions: Vec<AgentQuestion> = analysis
        .missing_categories
        .iter()
        .filter_map(|category| canned_question(category))
        .collect();

    if !questions.is_empty() {
        return questions;
    }

    vec![AgentQuestion::new(
        "additional_details",
        "Could you tell me more about the form you need?",
        "general",
    )
    .with_input_type(InputType::Textarea)
    .with_placeholder("Describe who fills it in and what it should collect")
    .with_help_text("Any detail helps us build the right form")]
}

fn canned_question(category: &str) -> Option<AgentQuestion> {
    let question = match category {
        categories::FORM_PURPOSE => AgentQuestion::new(
            "purpose_question",
            "What is the main purpose of this form?",
            categories::FORM_PURPOSE,
        )
        .with_input_type(InputType::Textarea)
        .with_placeholder("e.g. Collect feedback from customers after a purchase")
        .with_help_text("Knowing the goal helps us choose the right fields"),

        categories::REQUIRED_FIELDS => AgentQuestion::new(
            "fields_question",
            "What information do you need to collect from users?",
            categories::REQUIRED_FIELDS,
        )
        .with_input_type(InputType::Textarea)
        .with_placeholder("e.g. Name, email, phone number, message")
        .with_help_text("List every field the form should contain"),

        categories::VALIDATION_RULES => AgentQuestion::new(
            "validation_question",
            "Are there any validation requirements for the fields?",
            categories::VALIDATION_RULES,
        )
        .with_input_type(InputType::Multiselect)
        .with_options(
            [
                "Required fields",
                "Email format",
                "Phone number format",
                "Minimum or maximum length",
                "Numeric ranges",
                "No special validation",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        )
        .with_required(false)
        .with_placeholder(default_placeholder(InputType::Multiselect))
        .with_help_text("Pick the checks the form should enforce"),

        _ => return None,
    };
    Some(question)
}
