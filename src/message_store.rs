use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// One conversation entry as the backend serializes it. The text field is
/// named `message` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub message_id: String,
    pub sender: Sender,
    #[serde(rename = "message")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ChatMessage {
    pub fn local(id_prefix: &str, sender: Sender, text: impl Into<String>) -> Self {
        Self {
            message_id: format!("{id_prefix}_{}", epoch_millis()),
            sender,
            text: text.into(),
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    pub fn local_user(id_prefix: &str, text: impl Into<String>) -> Self {
        Self::local(id_prefix, Sender::User, text)
    }

    pub fn local_ai_error(text: impl Into<String>) -> Self {
        Self::local("err", Sender::Ai, text)
    }
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Append-only log of the active session's conversation. Insertion order is
/// display order; switching sessions replaces the store wholesale.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<ChatMessage>,
}

impl MessageStore {
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn replace_all(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

#[cfg(test)]
#[path = "../tests/unit/message_store_tests.rs"]
mod tests;
