//! Registry of live conversations.
//!
//! Each session gets its own [`ConversationManager`] behind a
//! `tokio::sync::Mutex`, so concurrent requests for the same session are
//! serialized while different sessions proceed independently.
//!
//! # Thread Safety
//!
//! The session map sits behind a `RwLock`: lookups vastly outnumber
//! opens and closes.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::ConversationManager;
use crate::application::agents::AgentSet;
use crate::config::ConversationConfig;
use crate::domain::foundation::SessionId;

/// Shared handle to one session's manager.
pub type SessionHandle = Arc<Mutex<ConversationManager>>;

/// Maps session ids to their conversation managers.
pub struct ConversationSessions {
    agents: AgentSet,
    config: ConversationConfig,
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl ConversationSessions {
    pub fn new(agents: AgentSet, config: ConversationConfig) -> Self {
        Self {
            agents,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a session with a fresh manager sharing this registry's agents.
    pub async fn open(&self) -> (SessionId, SessionHandle) {
        let session_id = SessionId::new();
        let manager = ConversationManager::with_session(
            self.agents.clone(),
            self.config.clone(),
            session_id,
        );
        let handle = Arc::new(Mutex::new(manager));

        self.sessions.write().await.insert(session_id, handle.clone());
        tracing::debug!(session_id = %session_id, "session opened");

        (session_id, handle)
    }

    pub async fn get(&self, session_id: &SessionId) -> Option<SessionHandle> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Drops the session. Returns false if it was not open.
    pub async fn close(&self, session_id: &SessionId) -> bool {
        let removed = self.sessions.write().await.remove(session_id).is_some();
        if removed {
            tracing::debug!(session_id = %session_id, "session closed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockAIProvider, StaticApiConfigSource};
    use crate::config::AppConfig;
    use crate::ports::ApiConfig;
    use serde_json::json;

    fn sessions(provider: &MockAIProvider) -> ConversationSessions {
        let config = AppConfig::default();
        let agents = AgentSet::new(
            Arc::new(provider.clone()),
            Arc::new(StaticApiConfigSource::new(
                ApiConfig::new("test", "http://localhost", "m").with_api_key("k"),
            )),
            &config,
        );
        ConversationSessions::new(agents, config.conversation)
    }

    #[tokio::test]
    async fn open_get_close() {
        let registry = sessions(&MockAIProvider::new());
        assert!(registry.is_empty().await);

        let (id, handle) = registry.open().await;
        assert_eq!(handle.lock().await.session_id(), id);
        assert_eq!(registry.len().await, 1);
        assert!(registry.get(&id).await.is_some());

        assert!(registry.close(&id).await);
        assert!(!registry.close(&id).await);
        assert!(registry.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn sessions_keep_separate_state() {
        let complete = json!({"isComplete": true, "confidence": 0.9, "reasoning": "ok"}).to_string();
        let provider = MockAIProvider::new().with_response_when("Analyze this form request", complete);
        let registry = sessions(&provider);

        let (first, first_handle) = registry.open().await;
        let (second, _) = registry.open().await;
        assert_ne!(first, second);

        first_handle.lock().await.start_conversation("Contact form").await;

        let second_handle = registry.get(&second).await.unwrap();
        assert!(first_handle.lock().await.current_state().is_complete);
        assert!(second_handle.lock().await.conversation_history().is_empty());
    }
}
