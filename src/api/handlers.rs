//! HTTP handlers over the conversation service

use crate::conversation::{ChatResponse, ConversationService};
use crate::error::ChatError;
use crate::llm::CompletionError;
use crate::metrics::METRICS;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Error codes returned in `ApiError::code`
pub mod error_codes {
    pub const COMPLETION_FAILED: &str = "COMPLETION_FAILED";
    pub const COMPLETION_TIMEOUT: &str = "COMPLETION_TIMEOUT";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application state for chat handlers
#[derive(Clone)]
pub struct ChatState {
    pub service: Arc<ConversationService>,
}

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub sessions: usize,
}

/// Send a message within a conversation
///
/// GET /api/v1/chat/:conversation_id?message=...
pub async fn chat(
    State(state): State<ChatState>,
    Path(conversation_id): Path<String>,
    Query(query): Query<ChatQuery>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ApiError>)> {
    debug!(
        "Received chat request for conversation {} with message: {}",
        conversation_id, query.message
    );

    match state.service.process_message(&conversation_id, &query.message).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Chat request for conversation {} failed: {}", conversation_id, e);
            let (status, code) = match &e {
                ChatError::Completion(CompletionError::Timeout(_)) => {
                    (StatusCode::GATEWAY_TIMEOUT, error_codes::COMPLETION_TIMEOUT)
                }
                ChatError::Completion(_) => (StatusCode::BAD_GATEWAY, error_codes::COMPLETION_FAILED),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR),
            };
            Err((status, Json(ApiError::new(code, e.to_string()))))
        }
    }
}

/// GET /health
pub async fn health(State(state): State<ChatState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        sessions: state.service.store().len(),
    })
}

/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.export_prometheus(),
    )
}
