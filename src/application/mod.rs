//! Application layer - Agents and conversation orchestration.
//!
//! This layer coordinates domain types and the AI provider port:
//! agents wrap single model calls, the conversation manager sequences them.

pub mod agents;
pub mod conversation;

pub use agents::{AgentError, AgentOutcome, AgentSet};
pub use conversation::{ConversationManager, ConversationSessions, SessionHandle};
