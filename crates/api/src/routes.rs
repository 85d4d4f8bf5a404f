//! HTTP route handlers for the API.

use crate::AppState;
use axum::{
    Json,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use komando_common::{DelegateCategory, KomandoError};
use komando_coordinator::{ConversationEvent, ConversationSnapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub classifier_model: String,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        classifier_model: state.coordinator.classifier_model().to_string(),
    })
}

/// Message request body.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub content: String,
}

/// Returned when a submission has been accepted for processing.
#[derive(Debug, Serialize)]
pub struct MessageAccepted {
    pub status: &'static str,
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    pub code: &'static str,
}

impl From<KomandoError> for ErrorResponse {
    fn from(err: KomandoError) -> Self {
        let (status, code) = match &err {
            KomandoError::Busy => (StatusCode::CONFLICT, "BUSY"),
            KomandoError::EmptyUtterance => (StatusCode::BAD_REQUEST, "EMPTY_UTTERANCE"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        Self {
            status,
            error: err.to_string(),
            code,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Current transcript and dispatch state.
pub async fn get_conversation(State(state): State<Arc<AppState>>) -> Json<ConversationSnapshot> {
    Json(state.coordinator.snapshot().await)
}

/// Submit an utterance to the coordinator.
///
/// Responds as soon as the submission is accepted; the resulting turns are
/// delivered over the WebSocket and visible through `GET /api/v1/conversation`.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MessageRequest>,
) -> Result<(StatusCode, Json<MessageAccepted>), ErrorResponse> {
    info!(
        content_preview = %request.content.chars().take(50).collect::<String>(),
        "Received message"
    );

    // The pipeline task keeps running after its handle is dropped.
    let _pipeline = state
        .coordinator
        .submit_detached(request.content)
        .await
        .map_err(|e| {
            debug!(error = %e, "Submission rejected");
            ErrorResponse::from(e)
        })?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageAccepted { status: "accepted" }),
    ))
}

/// Clear the conversation back to its welcome turn.
pub async fn reset_conversation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ConversationSnapshot>, ErrorResponse> {
    state.coordinator.reset().await?;
    Ok(Json(state.coordinator.snapshot().await))
}

/// One entry of the agent directory.
#[derive(Debug, Serialize)]
pub struct AgentInfo {
    pub category: DelegateCategory,
    pub display_name: &'static str,
    pub is_delegate: bool,
}

/// List the coordinator and its sub-agents.
pub async fn list_agents() -> Json<Vec<AgentInfo>> {
    Json(
        DelegateCategory::ALL
            .into_iter()
            .map(|category| AgentInfo {
                category,
                display_name: category.display_name(),
                is_delegate: category.is_delegate(),
            })
            .collect(),
    )
}

/// WebSocket handler for real-time streaming of conversation events.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let events = state.coordinator.subscribe();
    ws.on_upgrade(move |socket| handle_websocket(socket, events))
}

/// Forward conversation events to the client until either side goes away.
async fn handle_websocket(socket: WebSocket, mut events: broadcast::Receiver<ConversationEvent>) {
    info!("WebSocket connection established");
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(payload) => payload,
                        Err(e) => {
                            error!(error = %e, "Failed to encode conversation event");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "WebSocket client lagging, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => {
                    info!("WebSocket connection closed");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!(error = %e, "WebSocket error");
                    break;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.1.0",
            uptime_seconds: 100,
            classifier_model: "gemini-2.5-flash".into(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("gemini-2.5-flash"));
    }

    #[test]
    fn test_message_request_deserialization() {
        let json = r#"{"content": "Cek jadwal dokter"}"#;
        let request: MessageRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.content, "Cek jadwal dokter");
    }

    #[test]
    fn test_error_mapping() {
        let busy = ErrorResponse::from(KomandoError::Busy);
        assert_eq!(busy.status, StatusCode::CONFLICT);
        assert_eq!(busy.code, "BUSY");

        let empty = ErrorResponse::from(KomandoError::EmptyUtterance);
        assert_eq!(empty.status, StatusCode::BAD_REQUEST);

        let other = ErrorResponse::from(KomandoError::Classifier("down".into()));
        assert_eq!(other.status, StatusCode::INTERNAL_SERVER_ERROR);

        let json = serde_json::to_string(&busy).unwrap();
        assert!(!json.contains("status"));
    }

    #[tokio::test]
    async fn test_agent_directory_lists_all_categories() {
        let Json(agents) = list_agents().await;
        assert_eq!(agents.len(), 5);
        assert_eq!(agents.iter().filter(|a| a.is_delegate).count(), 4);
        assert_eq!(agents[0].display_name, "Koordinator Pusat");
    }
}
