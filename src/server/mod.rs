//! HTTP surface: the chat and text-to-speech proxy endpoints.

pub mod error;
pub mod handlers;

pub use error::{ChatApiError, SpeechApiError};

use crate::ai::{ChatService, SpeechService};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared, immutable state for the proxy handlers.
pub struct AppState {
    pub chat: Option<Arc<dyn ChatService>>,
    pub speech: Option<Arc<dyn SpeechService>>,
}

/// Build the proxy router.
///
/// `max_body_bytes` bounds request bodies; chat bodies carry inline images.
pub fn router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/chat", post(handlers::chat))
        .route("/api/text-to-speech", post(handlers::text_to_speech))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
