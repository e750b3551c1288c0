//! Chat routes — the responder plus the settings a chat front-end renders.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::debug;

use crate::state::AppState;
use faqbot_chat::types::*;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat/status", get(get_status))
        .route("/chat/config", get(get_config))
        .route("/chat/examples", get(get_examples))
}

// ---------------------------------------------------------------
// Chat
// ---------------------------------------------------------------

/// POST /api/chat — always 200; failures come back as the fixed error text.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let config = req.generation_config();
    debug!(
        max_tokens = config.max_tokens,
        temperature = config.temperature,
        top_p = config.top_p,
        "Chat request"
    );

    let response = state
        .responder
        .respond(&req.message, &req.history, &config)
        .await;

    Json(ChatResponse { response })
}

// ---------------------------------------------------------------
// Status and UI settings
// ---------------------------------------------------------------

async fn get_status(State(state): State<Arc<AppState>>) -> Json<ChatStatus> {
    Json(state.inference.to_status())
}

async fn get_config() -> Json<ParameterPanel> {
    Json(ParameterPanel::default())
}

async fn get_examples() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "examples": EXAMPLE_PROMPTS }))
}
