//! Chat message types and in-memory history
//!
//! Messages live for the process lifetime only; there is no durable
//! persistence by design.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::knowledge::FaqStep;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// How the assistant produced (or the UI should render) a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Faq,
    Simulation,
    Error,
}

impl Default for MessageKind {
    fn default() -> Self {
        MessageKind::Text
    }
}

/// Structured extras attached to assistant responses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<FaqStep>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faq_match: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// One chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub content: String,
    pub role: MessageRole,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMeta>,
    pub created_at: DateTime<Utc>,
}

/// A message as submitted, before the store assigns id and timestamp
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub content: String,
    pub role: MessageRole,
    pub kind: MessageKind,
    pub metadata: Option<ResponseMeta>,
}

impl NewMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: MessageRole::User,
            kind: MessageKind::Text,
            metadata: None,
        }
    }

    pub fn assistant(
        content: impl Into<String>,
        kind: MessageKind,
        metadata: Option<ResponseMeta>,
    ) -> Self {
        Self {
            content: content.into(),
            role: MessageRole::Assistant,
            kind,
            metadata,
        }
    }
}

/// In-memory chat history, chronological by construction
#[derive(Default)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, new: NewMessage) -> Message {
        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            content: new.content,
            role: new.role,
            kind: new.kind,
            metadata: new.metadata,
            created_at: Utc::now(),
        };
        self.messages.push(message.clone());
        message
    }

    pub fn list(&self) -> &[Message] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
