use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::path::Path;
use validator::Validate;

use crate::models::ConversationTurn;
use crate::services::metrics;
use crate::startup::AppState;

/// File name used by `/save_conversation` when the body names none.
pub const DEFAULT_CONVERSATION_FILE: &str = "gym_conversation.json";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<ConversationTurn>,
    pub count: usize,
    pub status: &'static str,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct SaveConversationRequest {
    #[validate(length(min = 1, max = 255, message = "Filename must be 1-255 characters"))]
    pub filename: Option<String>,
}

#[tracing::instrument(skip(state, payload))]
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) = payload.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Invalid JSON body: {}", e.body_text()))
    })?;

    let user_message = request
        .message
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Message is required")))?;
    let user_message = user_message.trim();

    if user_message.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Message cannot be empty"
        )));
    }

    let response = state
        .chatbot
        .get_response(user_message)
        .await
        .context("Internal server error")?;

    Ok(Json(ChatResponse {
        response,
        status: "success",
    }))
}

#[tracing::instrument(skip(state))]
pub async fn clear_chat(State(state): State<AppState>) -> Result<Json<MessageResponse>, AppError> {
    state
        .chatbot
        .store()
        .clear()
        .context("Error clearing chat")?;
    metrics::set_conversation_turns(0);

    tracing::info!("Chat history cleared");

    Ok(Json(MessageResponse {
        message: "Chat history cleared successfully".to_string(),
        status: "success",
    }))
}

#[tracing::instrument(skip(state))]
pub async fn get_history(State(state): State<AppState>) -> Result<Json<HistoryResponse>, AppError> {
    let history = state
        .chatbot
        .store()
        .all()
        .context("Error getting history")?;

    Ok(Json(HistoryResponse {
        count: history.len(),
        history,
        status: "success",
    }))
}

/// Write the current history as a pretty-printed JSON array into the
/// conversations directory.
///
/// The body is optional; `{}` or no body at all saves to
/// [`DEFAULT_CONVERSATION_FILE`].
#[tracing::instrument(skip(state, body))]
pub async fn save_conversation(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    let request: SaveConversationRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SaveConversationRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid JSON body: {}", e)))?
    };
    request.validate()?;

    let filename = request
        .filename
        .map(|name| name.trim().to_string())
        .unwrap_or_else(|| DEFAULT_CONVERSATION_FILE.to_string());
    validate_filename(&filename)?;

    let history = state
        .chatbot
        .store()
        .all()
        .context("Error saving conversation")?;

    let dir = &state.config.chat.conversations_dir;
    write_conversation(dir, &filename, &history)
        .await
        .context("Error saving conversation")?;

    tracing::info!(
        filename = %filename,
        turns = history.len(),
        "Conversation saved"
    );

    Ok(Json(MessageResponse {
        message: format!("Conversation saved as {}", filename),
        status: "success",
    }))
}

/// Reject names that would escape the conversations directory.
fn validate_filename(filename: &str) -> Result<(), AppError> {
    if filename.trim().is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Filename cannot be empty"
        )));
    }
    if filename.contains(['/', '\\']) || filename == "." || filename.contains("..") {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Filename must not contain path separators or '..'"
        )));
    }
    Ok(())
}

async fn write_conversation(
    dir: &Path,
    filename: &str,
    history: &[ConversationTurn],
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(history)?;
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(dir.join(filename), json).await?;
    Ok(())
}
