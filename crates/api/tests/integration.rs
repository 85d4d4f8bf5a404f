//! Integration tests for the API layer.
//!
//! These tests spin up a real HTTP server on a random port, backed by a
//! coordinator whose classifier is scripted.

use async_trait::async_trait;
use komando_agents::{ExecutorConfig, SubAgentExecutor};
use komando_api::{AppState, create_router};
use komando_common::{Intent, Result};
use komando_coordinator::{Coordinator, CoordinatorConfig};
use komando_llm::{ClassifierClient, ClassifierRequest, ClassifierResponse, FunctionCall};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Delegates every utterance to the scheduling sub-agent once released.
struct SchedulingClient {
    gate: Option<Arc<Notify>>,
}

#[async_trait]
impl ClassifierClient for SchedulingClient {
    async fn complete(&self, request: ClassifierRequest) -> Result<ClassifierResponse> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let utterance = request
            .history
            .last()
            .map(|entry| entry.text.clone())
            .unwrap_or_default();
        let name = "panggil_sub_agen_penjadwal";
        Ok(ClassifierResponse {
            text: None,
            function_calls: vec![FunctionCall {
                name: name.to_string(),
                args: Intent::with_request(name, utterance).argument,
            }],
        })
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Spin up a test server on a random port and return the base URL.
async fn start_test_server(gate: Option<Arc<Notify>>) -> String {
    let config = CoordinatorConfig {
        executor: ExecutorConfig::immediate(),
        ..Default::default()
    };
    let coordinator = Coordinator::with_components(
        &config,
        Arc::new(SchedulingClient { gate }),
        Arc::new(SubAgentExecutor::with_default_agents(ExecutorConfig::immediate())),
    );
    let state = Arc::new(AppState::with_coordinator(Arc::new(coordinator)));
    let router = create_router(state, Some(vec!["*".to_string()]));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Helper to GET a URL and return (status, body as JSON).
async fn get(base: &str, path: &str) -> (u16, serde_json::Value) {
    let resp = reqwest::Client::new()
        .get(format!("{}{}", base, path))
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

/// Helper to POST JSON and return (status, body as JSON).
async fn post_json(base: &str, path: &str, json: serde_json::Value) -> (u16, serde_json::Value) {
    let resp = reqwest::Client::new()
        .post(format!("{}{}", base, path))
        .json(&json)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

/// Poll the conversation until it is idle.
async fn wait_until_idle(base: &str) -> serde_json::Value {
    for _ in 0..100 {
        let (_, snapshot) = get(base, "/api/v1/conversation").await;
        if snapshot["busy"] == false {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("conversation never became idle");
}

// ============================================================================
// Health and directory
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let base = start_test_server(None).await;
    let (status, body) = get(&base, "/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["classifier_model"], "scripted");
}

#[tokio::test]
async fn test_agents_endpoint() {
    let base = start_test_server(None).await;
    let (status, body) = get(&base, "/api/v1/agents").await;
    assert_eq!(status, 200);
    let agents = body.as_array().unwrap();
    assert_eq!(agents.len(), 5);
    assert_eq!(agents[0]["category"], "COORDINATOR");
}

// ============================================================================
// Conversation
// ============================================================================

#[tokio::test]
async fn test_initial_conversation_has_welcome_turn() {
    let base = start_test_server(None).await;
    let (status, body) = get(&base, "/api/v1/conversation").await;
    assert_eq!(status, 200);
    assert_eq!(body["turns"].as_array().unwrap().len(), 1);
    assert_eq!(body["busy"], false);
    assert_eq!(body["active_category"], "COORDINATOR");
}

#[tokio::test]
async fn test_message_is_accepted_and_delegated() {
    let base = start_test_server(None).await;
    let (status, body) = post_json(
        &base,
        "/api/v1/messages",
        serde_json::json!({"content": "Jadwalkan kontrol dr. Siti"}),
    )
    .await;
    assert_eq!(status, 202);
    assert_eq!(body["status"], "accepted");

    let snapshot = wait_until_idle(&base).await;
    let turns = snapshot["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 4);
    assert_eq!(turns[1]["text"], "Jadwalkan kontrol dr. Siti");
    assert_eq!(turns[2]["is_notice"], true);
    assert_eq!(turns[3]["category"], "APPOINTMENTS");
    assert_eq!(snapshot["active_category"], "APPOINTMENTS");
}

#[tokio::test]
async fn test_blank_message_is_rejected() {
    let base = start_test_server(None).await;
    let (status, body) =
        post_json(&base, "/api/v1/messages", serde_json::json!({"content": "  "})).await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "EMPTY_UTTERANCE");
}

#[tokio::test]
async fn test_busy_conversation_rejects_message_and_reset() {
    let gate = Arc::new(Notify::new());
    let base = start_test_server(Some(gate.clone())).await;

    let (status, _) =
        post_json(&base, "/api/v1/messages", serde_json::json!({"content": "Pertama"})).await;
    assert_eq!(status, 202);

    let (status, body) =
        post_json(&base, "/api/v1/messages", serde_json::json!({"content": "Kedua"})).await;
    assert_eq!(status, 409);
    assert_eq!(body["code"], "BUSY");

    let (status, _) = post_json(&base, "/api/v1/conversation/reset", serde_json::json!({})).await;
    assert_eq!(status, 409);

    gate.notify_one();
    let snapshot = wait_until_idle(&base).await;
    let turns = snapshot["turns"].as_array().unwrap();
    assert!(turns.iter().all(|t| t["text"] != "Kedua"));
}

#[tokio::test]
async fn test_reset_clears_transcript() {
    let base = start_test_server(None).await;
    post_json(&base, "/api/v1/messages", serde_json::json!({"content": "Halo"})).await;
    wait_until_idle(&base).await;

    let (status, body) =
        post_json(&base, "/api/v1/conversation/reset", serde_json::json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["turns"].as_array().unwrap().len(), 1);
}
