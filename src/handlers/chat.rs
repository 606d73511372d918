use axum::{Json, extract::State, extract::rejection::JsonRejection};

use super::AppState;
use crate::error::ApiError;
use crate::models::{ChatReply, ChatRequest};

/// `POST /chat`: classify the message and answer with text plus chart data.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!("Rejected chat request: {}", rejection.body_text());
        ApiError::BadRequest(rejection.body_text())
    })?;

    if let Some(conversation_id) = &request.conversation_id {
        tracing::debug!(%conversation_id, "Chat message received");
    }

    Ok(Json(state.dispatcher.handle(&request.message).await))
}
