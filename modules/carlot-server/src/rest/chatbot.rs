use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::state::AppState;
use carlot_domains::chatbot::ERROR_REPLY;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    message: String,
}

/// `{message}` in, `{reply}` out. Not wrapped in the success envelope.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> impl IntoResponse {
    match state.chatbot.reply(&body.message).await {
        Ok(reply) => (StatusCode::OK, Json(json!({ "reply": reply }))),
        Err(e) => {
            error!(error = %e, "Chatbot failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "reply": ERROR_REPLY })),
            )
        }
    }
}
