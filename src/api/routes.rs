//! Router construction

use super::handlers::{self, ChatState};
use crate::conversation::ConversationService;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Build the chat API router
pub fn build_router(service: Arc<ConversationService>) -> Router {
    let state = ChatState { service };

    Router::new()
        .route("/api/v1/chat/:conversation_id", get(handlers::chat))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
