//! API routes
//!
//! Thin JSON glue over the core: handlers validate input, call the search
//! engine / assistant / stores, and shape responses. No search logic here.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::assistant::Assistant;
use crate::chat::{MessageStore, NewMessage};
use crate::knowledge::KnowledgeBase;
use crate::search::{HybridSearchEngine, SearchResult};

/// Application state shared across requests
pub struct AppState {
    pub engine: HybridSearchEngine,
    pub knowledge: KnowledgeBase,
    pub messages: RwLock<MessageStore>,
    pub assistant: Assistant,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Deserialize)]
pub struct SimulateRequest {
    pub action: Option<String>,
}

#[derive(Deserialize)]
pub struct FaqSearchQuery {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqSearchResponse {
    pub results: Vec<SearchResult>,
    pub total: usize,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Chat history, oldest first
pub async fn list_messages(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let messages = state.messages.read().await;
    Json(messages.list().to_vec())
}

/// Accept a user message, answer it, and return the assistant message
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.content.trim().is_empty() {
        return Err(bad_request("Message content is required"));
    }

    let limit = state.engine.config().default_limit;
    let faq_hits = state.engine.search(&payload.content, limit).await;

    {
        let mut messages = state.messages.write().await;
        messages.create(NewMessage::user(payload.content.clone()));
    }

    let response = state.assistant.answer_query(&payload.content, &faq_hits).await;

    let stored = {
        let mut messages = state.messages.write().await;
        messages.create(NewMessage::assistant(
            response.content,
            response.kind,
            Some(response.metadata),
        ))
    };

    Ok(Json(stored))
}

/// Clear chat history
pub async fn clear_messages(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.messages.write().await.clear();
    Json(serde_json::json!({ "success": true }))
}

/// All FAQ records, for "browse all" views. Bypasses search.
pub async fn list_faq(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.knowledge.load_all().to_vec())
}

/// Ranked FAQ search
pub async fn search_faq(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FaqSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let query = params
        .q
        .ok_or_else(|| bad_request("Query parameter 'q' is required"))?;

    let limit = params.limit.unwrap_or(state.engine.config().default_limit);
    let results = state.engine.search(&query, limit).await;
    let total = results.len();

    Ok(Json(FaqSearchResponse { results, total }))
}

/// Generate a TallyPrime walkthrough and store it as an assistant message
pub async fn simulate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SimulateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let action = payload
        .action
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| bad_request("Action is required"))?;

    let response = state.assistant.generate_simulation(&action).await;

    let stored = {
        let mut messages = state.messages.write().await;
        messages.create(NewMessage::assistant(
            response.content,
            response.kind,
            Some(response.metadata),
        ))
    };

    Ok(Json(stored))
}

/// Engine introspection for operational tooling
pub async fn search_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.engine.stats())
}
