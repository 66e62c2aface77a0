pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// One prior exchange entry kept for conversational context.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// Fixed parameters a remote session is opened with.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub model: String,
    pub system_instruction: String,
}

impl SessionConfig {
    pub fn new(model: impl Into<String>, system_instruction: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_instruction: system_instruction.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamChunk {
    pub delta: String,
    pub done: bool,
    /// Set on the terminating chunk of an exchange that failed.
    #[serde(default)]
    pub error: bool,
}

impl StreamChunk {
    pub fn delta(text: impl Into<String>) -> Self {
        Self {
            delta: text.into(),
            done: false,
            error: false,
        }
    }

    pub fn done() -> Self {
        Self {
            delta: String::new(),
            done: true,
            error: false,
        }
    }

    pub fn failed() -> Self {
        Self {
            delta: String::new(),
            done: true,
            error: true,
        }
    }
}

/// Opens conversations with a remote assistant.
///
/// Credentials are resolved inside `create_session`, so a missing key is
/// reported as [`LlmError::Configuration`] at the moment a session is needed.
pub trait ChatBackend: Send + Sync {
    fn create_session(&self, config: &SessionConfig) -> Result<Box<dyn ChatSession>, LlmError>;
}

/// A live conversation. Prior successful turns are retained as context.
#[async_trait]
pub trait ChatSession: Send {
    async fn send_message(&mut self, text: &str) -> Result<String, LlmError>;

    /// Streams partial text through `on_chunk`, ending with a `done` chunk on
    /// success. On failure no terminating chunk is sent; callers emit one.
    async fn send_message_stream(
        &mut self,
        text: &str,
        on_chunk: &(dyn Fn(StreamChunk) + Send + Sync),
    ) -> Result<String, LlmError> {
        let reply = self.send_message(text).await?;
        on_chunk(StreamChunk::delta(reply.clone()));
        on_chunk(StreamChunk::done());
        Ok(reply)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

impl LlmError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, LlmError::Configuration(_))
    }
}

impl Serialize for LlmError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
