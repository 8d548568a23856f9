//! Conversation orchestration: one manager per session plus a registry.

mod manager;
mod sessions;

pub use manager::ConversationManager;
pub use sessions::{ConversationSessions, SessionHandle};
