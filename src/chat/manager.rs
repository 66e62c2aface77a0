use crate::llm::{ChatBackend, ChatSession, LlmError, SessionConfig, StreamChunk};
use futures::lock::Mutex;
use serde::Serialize;

/// Returned in place of a reply whenever an exchange fails for any reason.
pub const APOLOGY: &str =
    "Sorry, I'm having trouble connecting right now. Please try again later.";

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoSession,
    SessionActive,
}

/// Owns the single conversation with the remote assistant.
///
/// The session is opened on the first send, reused while exchanges succeed,
/// and dropped on any failure so the next send starts over without context.
/// Sends are serialised by the session lock.
pub struct ChatSessionManager {
    backend: Box<dyn ChatBackend>,
    config: SessionConfig,
    session: Mutex<Option<Box<dyn ChatSession>>>,
}

impl ChatSessionManager {
    pub fn new(backend: impl ChatBackend + 'static, config: SessionConfig) -> Self {
        Self {
            backend: Box::new(backend),
            config,
            session: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub async fn state(&self) -> SessionState {
        if self.session.lock().await.is_some() {
            SessionState::SessionActive
        } else {
            SessionState::NoSession
        }
    }

    /// Drops the current session, if any.
    pub async fn reset(&self) {
        if self.session.lock().await.take().is_some() {
            tracing::info!("chat session reset");
        }
    }

    /// Sends `message` verbatim and returns the reply, or [`APOLOGY`] on failure.
    pub async fn send(&self, message: &str) -> String {
        self.exchange(message, None).await
    }

    /// Like [`send`](Self::send), delivering partial text as it arrives.
    pub async fn send_streaming(
        &self,
        message: &str,
        on_chunk: &(dyn Fn(StreamChunk) + Send + Sync),
    ) -> String {
        self.exchange(message, Some(on_chunk)).await
    }

    fn open_session(&self) -> Result<Box<dyn ChatSession>, LlmError> {
        let session = self.backend.create_session(&self.config)?;
        tracing::info!(model = %self.config.model, "chat session created");
        Ok(session)
    }

    async fn exchange(
        &self,
        message: &str,
        on_chunk: Option<&(dyn Fn(StreamChunk) + Send + Sync)>,
    ) -> String {
        let mut slot = self.session.lock().await;

        // Taken out for the exchange; only put back when it succeeds.
        let mut session = match slot.take() {
            Some(session) => session,
            None => match self.open_session() {
                Ok(session) => session,
                Err(e) => {
                    tracing::error!(error = %e, "cannot open chat session");
                    return Self::apologise(on_chunk);
                }
            },
        };

        let result = match on_chunk {
            Some(on_chunk) => session.send_message_stream(message, on_chunk).await,
            None => session.send_message(message).await,
        };

        match result {
            Ok(reply) => {
                *slot = Some(session);
                reply
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat exchange failed, dropping session");
                Self::apologise(on_chunk)
            }
        }
    }

    /// Streaming listeners always see a terminating chunk, even when partial
    /// text was already delivered before the failure.
    fn apologise(on_chunk: Option<&(dyn Fn(StreamChunk) + Send + Sync)>) -> String {
        if let Some(on_chunk) = on_chunk {
            on_chunk(StreamChunk::failed());
        }
        APOLOGY.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::testing::Script;
    use std::sync::Mutex as StdMutex;

    fn manager(script: &Script) -> ChatSessionManager {
        ChatSessionManager::new(script.backend(), SessionConfig::new("test-model", "prompt"))
    }

    #[tokio::test]
    async fn test_first_send_opens_session_and_returns_reply_verbatim() {
        let script = Script::new([Ok("  Rahul knows React and Node.js.\n")]);
        let manager = manager(&script);
        assert_eq!(manager.state().await, SessionState::NoSession);

        let reply = manager.send("What are Rahul's skills?").await;

        assert_eq!(reply, "  Rahul knows React and Node.js.\n");
        assert_eq!(manager.state().await, SessionState::SessionActive);
        assert_eq!(script.sessions_created(), 1);
    }

    #[tokio::test]
    async fn test_second_send_reuses_session() {
        let script = Script::new([Ok("one"), Ok("two")]);
        let manager = manager(&script);

        manager.send("first").await;
        manager.send("second").await;

        assert_eq!(script.sessions_created(), 1);
        assert_eq!(
            script.received(),
            vec![(0, "first".to_string()), (0, "second".to_string())]
        );
    }

    #[tokio::test]
    async fn test_session_receives_config() {
        let script = Script::new([Ok("ok")]);
        let manager = manager(&script);
        manager.send("hi").await;
        assert_eq!(
            script.configs(),
            vec![("test-model".to_string(), "prompt".to_string())]
        );
    }

    #[tokio::test]
    async fn test_failure_returns_apology_and_drops_session() {
        let script = Script::new([Ok("one"), Err("boom"), Ok("three")]);
        let manager = manager(&script);

        assert_eq!(manager.send("a").await, "one");
        assert_eq!(manager.send("b").await, APOLOGY);
        assert_eq!(manager.state().await, SessionState::NoSession);

        assert_eq!(manager.send("c").await, "three");
        assert_eq!(script.sessions_created(), 2);
        assert_eq!(script.received()[2], (1, "c".to_string()));
    }

    #[tokio::test]
    async fn test_missing_credentials_never_leak() {
        let script = Script::new([Ok("unused")]).without_credentials();
        let manager = manager(&script);

        let reply = manager.send("hello").await;

        assert_eq!(reply, APOLOGY);
        assert!(!reply.contains("API key"));
        assert_eq!(manager.state().await, SessionState::NoSession);
        assert_eq!(script.sessions_created(), 0);

        // Each later send retries opening a session and fails the same way.
        assert_eq!(manager.send("again").await, APOLOGY);
    }

    #[tokio::test]
    async fn test_reset_forces_new_session() {
        let script = Script::new([Ok("one"), Ok("two")]);
        let manager = manager(&script);

        manager.send("a").await;
        manager.reset().await;
        assert_eq!(manager.state().await, SessionState::NoSession);
        manager.send("b").await;

        assert_eq!(script.sessions_created(), 2);
    }

    #[tokio::test]
    async fn test_streaming_forwards_chunks() {
        let script = Script::new([Ok("streamed reply")]);
        let manager = manager(&script);
        let chunks = StdMutex::new(Vec::new());

        let reply = manager
            .send_streaming("hi", &|chunk: StreamChunk| chunks.lock().unwrap().push(chunk))
            .await;

        assert_eq!(reply, "streamed reply");
        assert_eq!(
            chunks.into_inner().unwrap(),
            vec![StreamChunk::delta("streamed reply"), StreamChunk::done()]
        );
    }

    #[tokio::test]
    async fn test_streaming_failure_after_partial_text_terminates_stream() {
        let script = Script::new([Err("reset by peer")]);
        let manager = manager(&script);
        let chunks = StdMutex::new(Vec::new());

        let reply = manager
            .send_streaming("hi", &|chunk: StreamChunk| chunks.lock().unwrap().push(chunk))
            .await;

        assert_eq!(reply, APOLOGY);
        assert_eq!(manager.state().await, SessionState::NoSession);
        assert_eq!(
            chunks.into_inner().unwrap(),
            vec![StreamChunk::delta("Partial "), StreamChunk::failed()]
        );
    }

    #[tokio::test]
    async fn test_streaming_without_credentials_terminates_stream() {
        let script = Script::new([Ok("unused")]).without_credentials();
        let manager = manager(&script);
        let chunks = StdMutex::new(Vec::new());

        let reply = manager
            .send_streaming("hi", &|chunk: StreamChunk| chunks.lock().unwrap().push(chunk))
            .await;

        assert_eq!(reply, APOLOGY);
        assert_eq!(chunks.into_inner().unwrap(), vec![StreamChunk::failed()]);
    }
}
