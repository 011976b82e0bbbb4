//! Integration tests for the API client against a mock backend

#![allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)]

mod common;

use callreview_client::{ApiClient, CallQuery, MemoryTokenStore, ResponsePolicy, UnauthorizedHandler};
use callreview_core::Error;
use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Default)]
struct CountingHandler {
    calls: AtomicUsize,
}

impl UnauthorizedHandler for CountingHandler {
    fn on_unauthorized(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn client(server: &MockServer, token: Option<&str>) -> ApiClient {
    let tokens = token.map_or_else(MemoryTokenStore::new, MemoryTokenStore::with_token);
    ApiClient::new(format!("{}/api", server.uri()), Arc::new(tokens))
}

#[tokio::test]
async fn test_bearer_token_attached() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rep_user()))
        .expect(1)
        .mount(&server)
        .await;

    let user = client(&server, Some("abc123"))
        .current_user(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(user.username, "sarah");
    assert!(!user.is_manager());
}

#[tokio::test]
async fn test_list_calls_sends_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/calls"))
        .and(query_param("limit", "20"))
        .and(query_param("rep_id", "rep-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([call_json(
            "c1", "Mike Chen", 1, 0, 0, 1
        )])))
        .expect(1)
        .mount(&server)
        .await;

    let calls = client(&server, Some("t"))
        .list_calls(&CallQuery::recent(20).for_rep("rep-7"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].rep_name, "Mike Chen");
    assert_eq!(calls[0].signal_count(), 1);
}

#[tokio::test]
async fn test_login_posts_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"username": "sarah", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "token_type": "bearer",
            "user": rep_user()
        })))
        .mount(&server)
        .await;

    let response = client(&server, None)
        .login("sarah", "pw", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.access_token, "fresh");
    assert_eq!(response.user.rep_name, "Sarah Johnson");
}

#[tokio::test]
async fn test_status_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reps"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"detail": "Managers only"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/calls/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Call not found"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/manager/analytics"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "boom"})))
        .mount(&server)
        .await;

    let api = client(&server, Some("t"));
    let cancel = CancellationToken::new();

    match api.list_reps(&cancel).await {
        Err(Error::Forbidden { message }) => assert_eq!(message, "Managers only"),
        other => panic!("expected Forbidden, got {other:?}"),
    }
    match api.get_call("missing", &cancel).await {
        Err(Error::NotFound { resource }) => assert_eq!(resource, "call missing"),
        other => panic!("expected NotFound, got {other:?}"),
    }
    match api.manager_analytics(&cancel).await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected Api, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reps"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client(&server, Some("t")).list_reps(&CancellationToken::new()).await;

    assert!(matches!(result, Err(Error::Serialization(_))));
}

#[tokio::test]
async fn test_unauthorized_runs_policy_once_per_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/calls"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token"})))
        .mount(&server)
        .await;

    let handler = Arc::new(CountingHandler::default());
    let api = client(&server, Some("stale"))
        .with_policy(ResponsePolicy::new().on_unauthorized(handler.clone()));

    let result = api.list_calls(&CallQuery::default(), &CancellationToken::new()).await;

    assert!(matches!(result, Err(Error::Unauthorized)));
    assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancelled_request_returns_promptly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/calls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let api = client(&server, Some("t"));
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        api.list_calls(&CallQuery::default(), &cancel),
    )
    .await
    .unwrap();

    assert!(matches!(result, Err(Error::Cancelled)));
}

#[tokio::test]
async fn test_chat_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({"message": "Any tips?", "call_id": "c1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Lead with value.",
            "timestamp": "2024-01-15T10:30:00"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/chat/history"))
        .and(query_param("call_id", "c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history_json("c1", 2)))
        .mount(&server)
        .await;

    let api = client(&server, Some("t"));
    let cancel = CancellationToken::new();

    let reply = api.send_chat("Any tips?", Some("c1"), &cancel).await.unwrap();
    let history = api.chat_history(Some("c1"), &cancel).await.unwrap();

    assert_eq!(reply.response, "Lead with value.");
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].message, "question 1");
}

#[tokio::test]
async fn test_submit_call_analysis() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/webhook/call-analysis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Call analysis stored successfully",
            "id": "c-99"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let submission = serde_json::from_value(json!({
        "call_id": "pipeline-99",
        "rep_id": "rep-1",
        "rep_name": "Sarah Johnson",
        "call_title": "Intro call",
        "call_date": "2024-01-15T10:30:00Z",
        "transcript_url": "https://transcripts.example.com/99",
        "analysis": {"summary": "Went well", "key_objections": [], "buying_signals": ["Budget approved"]}
    }))
    .unwrap();

    let receipt = client(&server, None)
        .submit_call_analysis(&submission, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(receipt.id, "c-99");
}
