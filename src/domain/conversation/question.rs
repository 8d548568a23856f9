//! Clarifying questions asked by the agent.

use serde::{Deserialize, Serialize};

/// Kind of input control a question should be answered with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Text,
    Textarea,
    Select,
    Multiselect,
}

impl InputType {
    /// Parses a model-supplied input type; unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "textarea" => Some(Self::Textarea),
            "select" => Some(Self::Select),
            "multiselect" | "multi-select" | "multi_select" => Some(Self::Multiselect),
            _ => None,
        }
    }

    /// Returns true if answers are picked from `options`.
    pub fn requires_options(&self) -> bool {
        matches!(self, Self::Select | Self::Multiselect)
    }
}

/// A typed clarifying question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentQuestion {
    pub id: String,
    pub question: String,
    pub category: String,
    pub input_type: InputType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

impl AgentQuestion {
    /// Creates a required free-text question.
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            category: category.into(),
            input_type: InputType::Text,
            options: None,
            required: true,
            placeholder: None,
            help_text: None,
        }
    }

    pub fn with_input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    /// A choice question must carry at least one option.
    pub fn is_well_formed(&self) -> bool {
        !self.input_type.requires_options()
            || self.options.as_ref().is_some_and(|o| !o.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognizes_known_types() {
        assert_eq!(InputType::parse("textarea"), Some(InputType::Textarea));
        assert_eq!(InputType::parse(" Select "), Some(InputType::Select));
        assert_eq!(InputType::parse("multiselect"), Some(InputType::Multiselect));
        assert_eq!(InputType::parse("slider"), None);
    }

    #[test]
    fn select_without_options_is_malformed() {
        let q = AgentQuestion::new("q", "Pick", "general").with_input_type(InputType::Select);
        assert!(!q.is_well_formed());
        assert!(q.with_options(vec!["a".into()]).is_well_formed());
    }

    #[test]
    fn serializes_camel_case_without_empty_optionals() {
        let json = serde_json::to_value(AgentQuestion::new("q1", "Why?", "form_purpose")).unwrap();
        assert_eq!(json["inputType"], "text");
        assert!(json.get("options").is_none());
        assert!(json.get("helpText").is_none());
    }
}
