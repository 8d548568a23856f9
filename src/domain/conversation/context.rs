//! Hand-off bundle for the external form generator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ConversationMessage, ConversationState, PromptAnalysis};

/// Everything a form generator needs once a conversation is complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormGenerationContext {
    pub original_prompt: String,
    pub conversation_history: Vec<ConversationMessage>,
    pub gathered_information: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<PromptAnalysis>,
    /// True when questioning stopped without a confident analysis.
    pub is_best_effort: bool,
}

impl FormGenerationContext {
    /// Builds the bundle from a completed state; `None` while incomplete.
    pub fn from_state(original_prompt: &str, state: &ConversationState) -> Option<Self> {
        if !state.is_complete {
            return None;
        }

        Some(Self {
            original_prompt: original_prompt.to_string(),
            conversation_history: state.messages.clone(),
            gathered_information: state.context.clone(),
            analysis: state.analysis.clone(),
            is_best_effort: state.is_best_effort,
        })
    }
}
