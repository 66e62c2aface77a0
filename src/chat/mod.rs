//! The portfolio assistant: session lifecycle, system prompt and the
//! append-only message log shown in the chat widget.

pub mod manager;
pub mod prompt;
pub mod widget;

#[cfg(test)]
pub(crate) mod testing;

pub use manager::{ChatSessionManager, SessionState, APOLOGY};
pub use widget::{ChatWidget, SubmitRejected};

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A rendered chat entry. The id only gives list items a stable identity.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }
}
