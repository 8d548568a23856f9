//! Message entity for conversations.
//!
//! Messages are immutable records of user/agent/system exchanges. Append order
//! within a conversation is the source of truth for its history.

use crate::domain::foundation::{MessageId, Timestamp};
use serde::{Deserialize, Serialize};

/// Who produced a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Text typed by the user (prompt or answer).
    User,
    /// Agent output: analysis summaries, questions, readiness notices.
    Agent,
    /// Explanatory notices about degraded agent behavior.
    System,
}

impl MessageType {
    /// Returns the label used when rendering history into prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
            Self::System => "system",
        }
    }
}

/// Tags linking an agent message to the clarifying question it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    pub question_id: String,
    pub category: String,
    pub is_question: bool,
}

/// An immutable message within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    id: MessageId,
    #[serde(rename = "type")]
    message_type: MessageType,
    content: String,
    timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<MessageMetadata>,
}

impl ConversationMessage {
    /// Creates a new message stamped with the current time.
    pub fn new(message_type: MessageType, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            message_type,
            content: content.into(),
            timestamp: Timestamp::now(),
            metadata: None,
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageType::User, content)
    }

    /// Creates an agent message.
    pub fn agent(content: impl Into<String>) -> Self {
        Self::new(MessageType::Agent, content)
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageType::System, content)
    }

    /// Creates an agent message carrying a clarifying question.
    pub fn question(
        content: impl Into<String>,
        question_id: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let mut message = Self::agent(content);
        message.metadata = Some(MessageMetadata {
            question_id: question_id.into(),
            category: category.into(),
            is_question: true,
        });
        message
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn metadata(&self) -> Option<&MessageMetadata> {
        self.metadata.as_ref()
    }

    /// Returns true if this message carries a clarifying question.
    pub fn is_question(&self) -> bool {
        self.metadata.as_ref().is_some_and(|m| m.is_question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_type() {
        assert_eq!(ConversationMessage::user("hi").message_type(), MessageType::User);
        assert_eq!(ConversationMessage::agent("hi").message_type(), MessageType::Agent);
        assert_eq!(ConversationMessage::system("hi").message_type(), MessageType::System);
    }

    #[test]
    fn question_message_is_tagged() {
        let msg = ConversationMessage::question("What is it for?", "purpose", "form_purpose");

        assert!(msg.is_question());
        let meta = msg.metadata().unwrap();
        assert_eq!(meta.question_id, "purpose");
        assert_eq!(meta.category, "form_purpose");
    }

    #[test]
    fn plain_message_is_not_question() {
        assert!(!ConversationMessage::agent("Thanks").is_question());
    }

    #[test]
    fn serializes_with_type_field_and_camel_case_metadata() {
        let msg = ConversationMessage::question("Q?", "q1", "general");
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "agent");
        assert_eq!(json["metadata"]["questionId"], "q1");
        assert_eq!(json["metadata"]["isQuestion"], true);
    }

    #[test]
    fn metadata_omitted_when_absent() {
        let json = serde_json::to_value(ConversationMessage::user("hello")).unwrap();
        assert!(json.get("metadata").is_none());
    }
}
