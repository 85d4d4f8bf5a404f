//! REST/WebSocket gateway for the Komando coordinator.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/v1/conversation` - Transcript and dispatch state
//! - `POST /api/v1/messages` - Submit an utterance (`202`, or `409` while busy)
//! - `POST /api/v1/conversation/reset` - Clear the transcript
//! - `GET /api/v1/agents` - Coordinator and sub-agent directory
//! - `WS /api/v1/ws` - Conversation events as they happen
//!
//! # Architecture
//!
//! ```text
//! Client (browser/CLI)
//!    │
//!    ▼
//! ┌─────────────────┐
//! │   API Gateway   │ ◄── This crate
//! │     (Axum)      │
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │   Coordinator   │────►│   Sub-agents    │
//! │  (Classifier)   │     │   (Executor)    │
//! └─────────────────┘     └─────────────────┘
//! ```

pub mod routes;
pub mod state;

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use state::AppState;

/// Build the CORS layer from an optional origin allow-list.
///
/// `None` or a list containing `*` allows any origin.
fn cors_layer(origins: Option<Vec<String>>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match origins {
        Some(origins) if !origins.iter().any(|o| o == "*") => {
            let parsed: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(%origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            layer.allow_origin(parsed)
        }
        _ => layer.allow_origin(Any),
    }
}

/// Create the API router with all routes configured.
pub fn create_router(state: Arc<AppState>, cors_origins: Option<Vec<String>>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/v1/conversation", get(routes::get_conversation))
        .route(
            "/api/v1/conversation/reset",
            post(routes::reset_conversation),
        )
        .route("/api/v1/messages", post(routes::send_message))
        .route("/api/v1/agents", get(routes::list_agents))
        .route("/api/v1/ws", get(routes::websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Start the API server on the given address.
pub async fn serve(
    state: Arc<AppState>,
    addr: SocketAddr,
    cors_origins: Option<Vec<String>>,
) -> anyhow::Result<()> {
    let router = create_router(state, cors_origins);

    info!(%addr, "Starting Komando API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
