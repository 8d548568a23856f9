//! Conversation flow configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::conversation::COMPLETENESS_THRESHOLD;

/// Settings for the clarifying-question loop
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    /// Confidence an analysis must exceed to count as complete
    #[serde(default = "default_completeness_threshold")]
    pub completeness_threshold: f64,

    /// Number of recent messages shown to the question generator
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Questions kept per round
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,

    /// Re-analysis rounds before the conversation is force-completed
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
}

impl ConversationConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.completeness_threshold) {
            return Err(ValidationError::InvalidThreshold(
                "conversation.completeness_threshold",
            ));
        }
        if self.max_questions == 0 {
            return Err(ValidationError::InvalidLimit("conversation.max_questions"));
        }
        if self.max_rounds == 0 {
            return Err(ValidationError::InvalidLimit("conversation.max_rounds"));
        }
        Ok(())
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            completeness_threshold: default_completeness_threshold(),
            history_window: default_history_window(),
            max_questions: default_max_questions(),
            max_rounds: default_max_rounds(),
        }
    }
}

fn default_completeness_threshold() -> f64 {
    COMPLETENESS_THRESHOLD
}

fn default_history_window() -> usize {
    6
}

fn default_max_questions() -> usize {
    5
}

fn default_max_rounds() -> u32 {
    5
}
