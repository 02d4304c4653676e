//! Callweave server library logic.

pub mod api;
pub mod background;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use callweave_calls::{CallDispatcher, CallRegistry};
use callweave_voice::{AudioCache, TtsClient};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Maximum request body size (1 MiB). Protects against OOM from oversized
/// payloads; call requests and synthesis texts are far smaller.
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Application state shared across all request handlers.
pub struct AppState {
    /// Live call contexts.
    pub registry: CallRegistry,
    /// Outbound call origination.
    pub dispatcher: CallDispatcher,
    /// Speech synthesis client (cache-first).
    pub tts: TtsClient,
    /// On-disk audio artifact store, shared with the synthesis client.
    pub cache: AudioCache,
}

impl AppState {
    /// Builds the application state from loaded configuration.
    pub fn from_config(config: &config::Config) -> Self {
        let cache = AudioCache::new(&config.cache.dir);
        Self {
            registry: CallRegistry::new(),
            dispatcher: CallDispatcher::new(config.telephony.clone()),
            tts: TtsClient::new(config.synthesis.clone(), cache.clone()),
            cache,
        }
    }
}

/// Builds the application router with all routes.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health_handler))
        .route("/api/calls", post(api::start_call_handler))
        .route(
            "/api/calls/{callId}",
            get(api::get_call_handler).delete(api::end_call_handler),
        )
        .route("/api/audio/synthesize", post(api::synthesize_handler))
        .route("/audio/{filename}", get(api::get_audio_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(state))
}
