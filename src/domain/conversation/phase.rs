//! Lifecycle phases of a prompt-to-form conversation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Where a conversation is in its analyze/ask/re-analyze loop.
///
/// `Init → Analyzing → {Complete | AwaitingAnswers} → Reanalyzing → …`.
/// `Complete` is terminal and reachable from every other phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    #[default]
    Init,
    Analyzing,
    AwaitingAnswers,
    Reanalyzing,
    Complete,
}

impl ConversationPhase {
    /// Returns true while the manager waits for the user to answer questions.
    pub fn expects_answers(&self) -> bool {
        matches!(self, Self::AwaitingAnswers)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Init => "Not started",
            Self::Analyzing => "Analyzing",
            Self::AwaitingAnswers => "Awaiting answers",
            Self::Reanalyzing => "Re-analyzing",
            Self::Complete => "Ready for form generation",
        }
    }
}

impl StateMachine for ConversationPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConversationPhase::*;
        matches!(
            (self, target),
            (Init, Analyzing)
                | (Init, Complete)
                | (Analyzing, AwaitingAnswers)
                | (Analyzing, Complete)
                | (AwaitingAnswers, Reanalyzing)
                | (AwaitingAnswers, Complete)
                | (Reanalyzing, AwaitingAnswers)
                | (Reanalyzing, Complete)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConversationPhase::*;
        match self {
            Init => vec![Analyzing, Complete],
            Analyzing => vec![AwaitingAnswers, Complete],
            AwaitingAnswers => vec![Reanalyzing, Complete],
            Reanalyzing => vec![AwaitingAnswers, Complete],
            Complete => vec![],
        }
    }
}
