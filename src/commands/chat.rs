use crate::chat::{ChatMessage, ChatWidget};
use crate::llm::StreamChunk;
use serde::Serialize;
use tauri::{Emitter, State};

#[derive(Clone, Serialize)]
struct ChatStreamEvent {
    delta: String,
    done: bool,
    error: bool,
}

/// Sends `content` to the assistant, streaming partial text as `chat-stream`
/// events, and returns the bot message appended to the log.
#[tauri::command]
pub async fn send_chat_message(
    app: tauri::AppHandle,
    widget: State<'_, ChatWidget>,
    content: String,
) -> Result<ChatMessage, String> {
    widget
        .submit_streaming(&content, &|chunk: StreamChunk| {
            let _ = app.emit(
                "chat-stream",
                ChatStreamEvent {
                    delta: chunk.delta,
                    done: chunk.done,
                    error: chunk.error,
                },
            );
        })
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_chat_messages(widget: State<'_, ChatWidget>) -> Vec<ChatMessage> {
    widget.messages()
}

#[tauri::command]
pub fn is_chat_loading(widget: State<'_, ChatWidget>) -> bool {
    widget.is_loading()
}

/// Starts a fresh conversation with the assistant; the visible log is kept.
#[tauri::command]
pub async fn reset_chat(widget: State<'_, ChatWidget>) -> Result<(), String> {
    widget.manager().reset().await;
    Ok(())
}
