//! Conversation State Entity
//!
//! Tracks the complete state of one prompt-to-form conversation: transcript,
//! pending questions, gathered answers and the latest analysis.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::domain::foundation::{SessionId, StateMachine, Timestamp, ValidationError};

use super::{AgentQuestion, ConversationMessage, ConversationPhase, PromptAnalysis};

/// Complete state of a conversation.
///
/// Owned by a single conversation manager and replaced wholesale on reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    pub session_id: SessionId,
    pub phase: ConversationPhase,
    pub messages: Vec<ConversationMessage>,
    pub current_questions: Vec<AgentQuestion>,
    pub context: BTreeMap<String, String>,
    pub is_complete: bool,
    /// Set when completion was forced without a confident analysis.
    pub is_best_effort: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<PromptAnalysis>,
    pub updated_at: Timestamp,
}

impl ConversationState {
    /// Create a new, empty conversation state.
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            phase: ConversationPhase::Init,
            messages: Vec::new(),
            current_questions: Vec::new(),
            context: BTreeMap::new(),
            is_complete: false,
            is_best_effort: false,
            analysis: None,
            updated_at: Timestamp::now(),
        }
    }

    /// Append a message to the transcript.
    pub fn add_message(&mut self, message: ConversationMessage) {
        self.messages.push(message);
        self.updated_at = Timestamp::now();
    }

    /// Move to another phase, enforcing the phase machine.
    pub fn advance(&mut self, target: ConversationPhase) -> Result<(), ValidationError> {
        self.phase = self.phase.transition_to(target)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Replace pending questions, keeping the first question for each id.
    pub fn set_questions(&mut self, questions: Vec<AgentQuestion>) {
        let mut seen = HashSet::new();
        self.current_questions = questions
            .into_iter()
            .filter(|q| seen.insert(q.id.clone()))
            .collect();
        self.updated_at = Timestamp::now();
    }

    /// Record an answer and drop the matching pending question.
    ///
    /// Returns true if a pending question was removed.
    pub fn record_answer(&mut self, question_id: &str, answer: impl Into<String>) -> bool {
        self.context.insert(question_id.to_string(), answer.into());
        let before = self.current_questions.len();
        self.current_questions.retain(|q| q.id != question_id);
        self.updated_at = Timestamp::now();
        before != self.current_questions.len()
    }

    /// Returns true if an answer was already stored for this question id.
    pub fn is_answered(&self, question_id: &str) -> bool {
        self.context.contains_key(question_id)
    }

    pub fn set_analysis(&mut self, analysis: PromptAnalysis) {
        self.analysis = Some(analysis);
        self.updated_at = Timestamp::now();
    }

    /// Mark the conversation ready for form generation.
    pub fn mark_complete(&mut self, best_effort: bool) -> Result<(), ValidationError> {
        if self.phase != ConversationPhase::Complete {
            self.advance(ConversationPhase::Complete)?;
        }
        self.is_complete = true;
        self.is_best_effort = self.is_best_effort || best_effort;
        self.current_questions.clear();
        Ok(())
    }

    /// Gathered answers rendered as `key: value` lines, in key order.
    pub fn gathered_lines(&self) -> Vec<String> {
        self.context
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect()
    }

    /// The most recent `n` messages, oldest first.
    pub fn recent_messages(&self, n: usize) -> &[ConversationMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::MessageType;

    fn question(id: &str) -> AgentQuestion {
        AgentQuestion::new(id, format!("Question {}?", id), "general")
    }

    #[test]
    fn new_state_is_empty_and_incomplete() {
        let state = ConversationState::new(SessionId::new());
        assert!(state.messages.is_empty());
        assert!(!state.is_complete);
        assert_eq!(state.phase, ConversationPhase::Init);
    }

    #[test]
    fn set_questions_keeps_ids_unique() {
        let mut state = ConversationState::new(SessionId::new());
        state.set_questions(vec![question("a"), question("b"), question("a")]);
        assert_eq!(state.current_questions.len(), 2);
    }

    #[test]
    fn record_answer_removes_question_and_stores_context() {
        let mut state = ConversationState::new(SessionId::new());
        state.set_questions(vec![question("a"), question("b")]);

        assert!(state.record_answer("a", "yes"));
        assert_eq!(state.current_questions.len(), 1);
        assert_eq!(state.context.get("a").map(String::as_str), Some("yes"));
        assert!(!state.record_answer("zzz", "stray"));
    }

    #[test]
    fn mark_complete_clears_questions_and_is_sticky_for_best_effort() {
        let mut state = ConversationState::new(SessionId::new());
        state.advance(ConversationPhase::Analyzing).unwrap();
        state.set_questions(vec![question("a")]);

        state.mark_complete(true).unwrap();
        assert!(state.is_complete);
        assert!(state.is_best_effort);
        assert!(state.current_questions.is_empty());

        state.mark_complete(false).unwrap();
        assert!(state.is_best_effort);
    }

    #[test]
    fn advance_rejects_invalid_transition() {
        let mut state = ConversationState::new(SessionId::new());
        assert!(state.advance(ConversationPhase::Reanalyzing).is_err());
        assert_eq!(state.phase, ConversationPhase::Init);
    }

    #[test]
    fn recent_messages_returns_tail() {
        let mut state = ConversationState::new(SessionId::new());
        for i in 0..10 {
            state.add_message(ConversationMessage::user(format!("m{}", i)));
        }
        let recent = state.recent_messages(6);
        assert_eq!(recent.len(), 6);
        assert_eq!(recent[0].content(), "m4");
        assert_eq!(recent[5].message_type(), MessageType::User);
        assert_eq!(state.recent_messages(50).len(), 10);
    }

    #[test]
    fn gathered_lines_are_key_value_pairs() {
        let mut state = ConversationState::new(SessionId::new());
        state.record_answer("purpose", "feedback");
        assert_eq!(state.gathered_lines(), vec!["purpose: feedback".to_string()]);
    }
}
