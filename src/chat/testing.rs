//! Scripted stand-in for the remote assistant.

use crate::llm::{ChatBackend, ChatSession, LlmError, SessionConfig, StreamChunk};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Shared {
    replies: VecDeque<Result<String, String>>,
    created: usize,
    received: Vec<(usize, String)>,
    configs: Vec<(String, String)>,
}

/// Replies are consumed in order across all sessions; `Err` entries fail
/// the exchange with an API error. When streaming, an `Err` entry first
/// delivers the partial text `"Partial "`.
#[derive(Clone)]
pub struct Script {
    shared: Arc<Mutex<Shared>>,
    has_credentials: bool,
    hanging: bool,
}

impl Script {
    pub fn new<const N: usize>(replies: [Result<&str, &str>; N]) -> Self {
        let replies = replies
            .into_iter()
            .map(|r| r.map(str::to_string).map_err(str::to_string))
            .collect();
        Self {
            shared: Arc::new(Mutex::new(Shared {
                replies,
                ..Shared::default()
            })),
            has_credentials: true,
            hanging: false,
        }
    }

    /// Sessions never answer; the send stays pending until dropped.
    pub fn hanging(mut self) -> Self {
        self.hanging = true;
        self
    }

    pub fn without_credentials(mut self) -> Self {
        self.has_credentials = false;
        self
    }

    pub fn backend(&self) -> FakeBackend {
        FakeBackend {
            script: self.clone(),
        }
    }

    pub fn sessions_created(&self) -> usize {
        self.shared.lock().unwrap().created
    }

    /// `(session index, message)` for every message any session received.
    pub fn received(&self) -> Vec<(usize, String)> {
        self.shared.lock().unwrap().received.clone()
    }

    pub fn configs(&self) -> Vec<(String, String)> {
        self.shared.lock().unwrap().configs.clone()
    }
}

pub struct FakeBackend {
    script: Script,
}

impl ChatBackend for FakeBackend {
    fn create_session(&self, config: &SessionConfig) -> Result<Box<dyn ChatSession>, LlmError> {
        if !self.script.has_credentials {
            return Err(LlmError::Configuration(
                "API key missing from environment variable GEMINI_API_KEY".into(),
            ));
        }
        let mut shared = self.script.shared.lock().unwrap();
        let index = shared.created;
        shared.created += 1;
        shared
            .configs
            .push((config.model.clone(), config.system_instruction.clone()));
        Ok(Box::new(FakeSession {
            index,
            script: self.script.clone(),
        }))
    }
}

struct FakeSession {
    index: usize,
    script: Script,
}

impl FakeSession {
    fn next_reply(&self, text: &str) -> Result<String, LlmError> {
        let mut shared = self.script.shared.lock().unwrap();
        shared.received.push((self.index, text.to_string()));
        match shared.replies.pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(LlmError::Api {
                status: 500,
                message,
            }),
            None => Err(LlmError::Parse("script exhausted".into())),
        }
    }
}

#[async_trait]
impl ChatSession for FakeSession {
    async fn send_message(&mut self, text: &str) -> Result<String, LlmError> {
        if self.script.hanging {
            futures::future::pending::<()>().await;
        }
        self.next_reply(text)
    }

    async fn send_message_stream(
        &mut self,
        text: &str,
        on_chunk: &(dyn Fn(StreamChunk) + Send + Sync),
    ) -> Result<String, LlmError> {
        if self.script.hanging {
            futures::future::pending::<()>().await;
        }
        match self.next_reply(text) {
            Ok(reply) => {
                on_chunk(StreamChunk::delta(reply.clone()));
                on_chunk(StreamChunk::done());
                Ok(reply)
            }
            Err(e) => {
                on_chunk(StreamChunk::delta("Partial "));
                Err(e)
            }
        }
    }
}
