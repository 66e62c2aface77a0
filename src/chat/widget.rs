use super::{ChatMessage, ChatSessionManager, APOLOGY};
use crate::llm::StreamChunk;
use crate::profile::Profile;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("message is empty")]
    Empty,
    #[error("a reply is still pending")]
    Busy,
}

#[derive(Debug, Default)]
struct WidgetState {
    messages: Vec<ChatMessage>,
    loading: bool,
}

/// Message log and loading flag behind the chat box.
///
/// The log only ever grows: failures arrive as ordinary bot messages.
pub struct ChatWidget {
    manager: Arc<ChatSessionManager>,
    state: Mutex<WidgetState>,
}

/// Clears the loading flag even if the pending submit is dropped. A submit
/// dropped before its reply arrived is answered with [`APOLOGY`], so every
/// user message in the log is followed by exactly one bot message.
struct LoadingGuard<'a> {
    widget: &'a ChatWidget,
    answered: bool,
}

impl LoadingGuard<'_> {
    fn answer(mut self, reply: String) -> ChatMessage {
        let message = ChatMessage::bot(reply);
        self.widget.state().messages.push(message.clone());
        self.answered = true;
        message
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.widget.state();
        if !self.answered {
            tracing::debug!("pending submit dropped before the reply arrived");
            state.messages.push(ChatMessage::bot(APOLOGY));
        }
        state.loading = false;
    }
}

impl ChatWidget {
    pub fn new(manager: Arc<ChatSessionManager>, greeting: impl Into<String>) -> Self {
        Self {
            manager,
            state: Mutex::new(WidgetState {
                messages: vec![ChatMessage::bot(greeting)],
                loading: false,
            }),
        }
    }

    pub fn greeting_for(profile: &Profile) -> String {
        format!(
            "Hi! I'm {name}'s AI assistant. Ask me anything about {name}'s skills, projects or experience.",
            name = profile.name
        )
    }

    fn state(&self) -> MutexGuard<'_, WidgetState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn manager(&self) -> &Arc<ChatSessionManager> {
        &self.manager
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state().messages.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    /// Appends `input` and the assistant's reply, returning the reply message.
    pub async fn submit(&self, input: &str) -> Result<ChatMessage, SubmitRejected> {
        self.submit_inner(input, None).await
    }

    pub async fn submit_streaming(
        &self,
        input: &str,
        on_chunk: &(dyn Fn(StreamChunk) + Send + Sync),
    ) -> Result<ChatMessage, SubmitRejected> {
        self.submit_inner(input, Some(on_chunk)).await
    }

    async fn submit_inner(
        &self,
        input: &str,
        on_chunk: Option<&(dyn Fn(StreamChunk) + Send + Sync)>,
    ) -> Result<ChatMessage, SubmitRejected> {
        if input.trim().is_empty() {
            return Err(SubmitRejected::Empty);
        }

        let loading = {
            let mut state = self.state();
            if state.loading {
                tracing::debug!("submit ignored while a reply is pending");
                return Err(SubmitRejected::Busy);
            }
            state.loading = true;
            state.messages.push(ChatMessage::user(input));
            LoadingGuard {
                widget: self,
                answered: false,
            }
        };

        let reply = match on_chunk {
            Some(on_chunk) => self.manager.send_streaming(input, on_chunk).await,
            None => self.manager.send(input).await,
        };

        Ok(loading.answer(reply))
    }
}
