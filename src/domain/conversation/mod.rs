//! Conversation Domain Module
//!
//! Value objects and the state entity for a prompt-to-form conversation.
//!
//! # Core Concepts
//!
//! - **ConversationMessage**: Immutable transcript entry (user/agent/system)
//! - **PromptAnalysis**: Completeness judgement of the prompt so far
//! - **AgentQuestion**: Typed clarifying question
//! - **ConversationState**: Transcript, pending questions and gathered answers
//! - **ConversationPhase**: Analyze/ask/re-analyze lifecycle

mod analysis;
mod context;
mod message;
mod phase;
mod question;
mod state;

pub use analysis::{categories, clamp_unit, dedup_ordered, PromptAnalysis, COMPLETENESS_THRESHOLD};
pub use context::FormGenerationContext;
pub use message::{ConversationMessage, MessageMetadata, MessageType};
pub use phase::ConversationPhase;
pub use question::{AgentQuestion, InputType};
pub use state::ConversationState;
