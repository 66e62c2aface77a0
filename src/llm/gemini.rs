use super::{
    ChatBackend, ChatSession, LlmError, SessionConfig, StreamChunk, Turn, TurnRole,
};
use crate::config::CredentialSource;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

impl GeminiContent {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![GeminiPart {
                text: Some(text.to_string()),
            }],
        }
    }
}

impl GeminiResponse {
    /// Concatenated text of the first candidate, if it carries any.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn wire_role(role: TurnRole) -> &'static str {
    match role {
        TurnRole::User => "user",
        TurnRole::Model => "model",
    }
}

fn build_request(system_instruction: &str, history: &[Turn], text: &str) -> GeminiRequest {
    let mut contents: Vec<GeminiContent> = history
        .iter()
        .map(|t| GeminiContent::text(Some(wire_role(t.role)), &t.text))
        .collect();
    contents.push(GeminiContent::text(Some("user"), text));

    GeminiRequest {
        system_instruction: GeminiContent::text(None, system_instruction),
        contents,
    }
}

fn api_error(status: u16, body: &str) -> LlmError {
    let message = serde_json::from_str::<GeminiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string());
    LlmError::Api { status, message }
}

/// Opens [`GeminiSession`]s against the Generative Language REST API.
pub struct GeminiBackend {
    credentials: Box<dyn CredentialSource>,
    base_url: String,
    client: Client,
}

impl GeminiBackend {
    pub fn new(credentials: impl CredentialSource + 'static) -> Self {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        credentials: impl CredentialSource + 'static,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            credentials: Box::new(credentials),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

impl ChatBackend for GeminiBackend {
    fn create_session(&self, config: &SessionConfig) -> Result<Box<dyn ChatSession>, LlmError> {
        let api_key = self.credentials.resolve().ok_or_else(|| {
            LlmError::Configuration(format!(
                "no API key available from {}",
                self.credentials.describe()
            ))
        })?;

        Ok(Box::new(GeminiSession {
            client: self.client.clone(),
            config: GeminiConfig {
                api_key,
                base_url: self.base_url.clone(),
            },
            model: config.model.clone(),
            system_instruction: config.system_instruction.clone(),
            history: Vec::new(),
        }))
    }
}

/// The REST endpoint is stateless, so the session carries the transcript
/// and replays it on every request.
pub struct GeminiSession {
    client: Client,
    config: GeminiConfig,
    model: String,
    system_instruction: String,
    history: Vec<Turn>,
}

impl GeminiSession {
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}",
            self.config.base_url, self.model, method
        )
    }

    fn commit(&mut self, user_text: &str, reply: &str) {
        self.history.push(Turn {
            role: TurnRole::User,
            text: user_text.to_string(),
        });
        self.history.push(Turn {
            role: TurnRole::Model,
            text: reply.to_string(),
        });
    }

    async fn post(&self, url: String, text: &str) -> Result<reqwest::Response, LlmError> {
        let body = build_request(&self.system_instruction, &self.history, text);

        let resp = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(api_error(status, &text));
        }
        Ok(resp)
    }
}

#[async_trait]
impl ChatSession for GeminiSession {
    async fn send_message(&mut self, text: &str) -> Result<String, LlmError> {
        let resp = self.post(self.endpoint("generateContent"), text).await?;

        let data: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;
        let reply = data
            .text()
            .ok_or_else(|| LlmError::Parse("response contained no text".into()))?;

        self.commit(text, &reply);
        Ok(reply)
    }

    async fn send_message_stream(
        &mut self,
        text: &str,
        on_chunk: &(dyn Fn(StreamChunk) + Send + Sync),
    ) -> Result<String, LlmError> {
        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let resp = self.post(url, text).await?;

        let mut full_content = String::new();
        let mut stream = resp.bytes_stream();
        let mut lines = SseLines::default();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for line in lines.push(&chunk)? {
                apply_sse_line(&line, &mut full_content, on_chunk)?;
            }
        }
        if let Some(line) = lines.finish()? {
            apply_sse_line(&line, &mut full_content, on_chunk)?;
        }

        if full_content.is_empty() {
            return Err(LlmError::Parse("stream contained no text".into()));
        }

        on_chunk(StreamChunk::done());
        self.commit(text, &full_content);
        Ok(full_content)
    }
}

/// Splits a byte stream into lines, decoding each only once it is complete
/// so multi-byte characters split across network chunks survive intact.
#[derive(Default)]
struct SseLines {
    pending: Vec<u8>,
}

impl SseLines {
    fn decode(line: &[u8]) -> Result<String, LlmError> {
        std::str::from_utf8(line)
            .map(|l| l.trim().to_string())
            .map_err(|e| LlmError::Parse(format!("invalid UTF-8 in stream: {e}")))
    }

    fn push(&mut self, bytes: &[u8]) -> Result<Vec<String>, LlmError> {
        self.pending.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(Self::decode(&line)?);
        }
        Ok(lines)
    }

    /// Trailing bytes after the last newline, if any.
    fn finish(&mut self) -> Result<Option<String>, LlmError> {
        if self.pending.is_empty() {
            return Ok(None);
        }
        let line = Self::decode(&std::mem::take(&mut self.pending))?;
        Ok(Some(line).filter(|l| !l.is_empty()))
    }
}

fn apply_sse_line(
    line: &str,
    full_content: &mut String,
    on_chunk: &(dyn Fn(StreamChunk) + Send + Sync),
) -> Result<(), LlmError> {
    if let Some(data) = line.strip_prefix("data: ") {
        let event: GeminiResponse =
            serde_json::from_str(data).map_err(|e| LlmError::Parse(e.to_string()))?;
        if let Some(delta) = event.text() {
            full_content.push_str(&delta);
            on_chunk(StreamChunk::delta(delta));
        }
    }
    Ok(())
}
