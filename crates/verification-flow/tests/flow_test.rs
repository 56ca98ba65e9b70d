//! Integration tests for the verification flow

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use guildgate_common::VerificationStatus;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use verification_flow::{
    ChannelNavigator, HttpVerificationClient, VerificationApi, VerificationFlow, SUCCESS_MESSAGE,
};

/// Stand-in for the remote verification endpoint
async fn fake_verify_handler(
    State(hits): State<Arc<AtomicUsize>>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::response::Response {
    hits.fetch_add(1, Ordering::SeqCst);

    match params.get("token").map(String::as_str) {
        Some("good-token") => Json(json!({ "message": "Email verified" })).into_response(),
        Some("expired-token") => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": "Token expired" }))).into_response()
        }
        Some("plain-failure") => (StatusCode::INTERNAL_SERVER_ERROR, "oops").into_response(),
        Some("framework-error") => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "statusCode": 400, "error": "Bad Request", "message": "Token expired" })),
        )
            .into_response(),
        Some("blank-error") => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "", "message": "Token expired" })),
        )
            .into_response(),
        Some("flag-error") => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": true, "message": "Token expired" })),
        )
            .into_response(),
        Some("nested-error") => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "code": "E_EXPIRED" }, "message": "Token expired" })),
        )
            .into_response(),
        Some("huge-error") => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "x".repeat(64 * 1024) })),
        )
            .into_response(),
        _ => (StatusCode::BAD_REQUEST, Json(json!({}))).into_response(),
    }
}

/// Spawn the fake endpoint; returns its URL and the hit counter
async fn spawn_endpoint() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/auth/verify-email", get(fake_verify_handler))
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/auth/verify-email", addr), hits)
}

fn http_flow(endpoint: String) -> VerificationFlow {
    let client = HttpVerificationClient::new(endpoint, Duration::from_secs(5)).unwrap();
    VerificationFlow::new(Arc::new(client), "/login")
}

#[tokio::test]
async fn test_accepted_token_succeeds() {
    let (endpoint, hits) = spawn_endpoint().await;
    let mut flow = http_flow(endpoint);

    let attempt = flow.activate(Some("good-token")).await;
    assert_eq!(attempt.status, VerificationStatus::Success);
    assert_eq!(attempt.message.as_deref(), Some(SUCCESS_MESSAGE));
    assert_eq!(flow.redirect().map(|r| r.target.as_str()), Some("/login"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rejected_token_shows_server_reason() {
    let (endpoint, _hits) = spawn_endpoint().await;
    let mut flow = http_flow(endpoint);

    let attempt = flow.activate(Some("expired-token")).await;
    assert_eq!(attempt.status, VerificationStatus::Error);
    assert_eq!(attempt.message.as_deref(), Some("Token expired"));
}

#[tokio::test]
async fn test_rejection_without_reason_uses_fallback() {
    let (endpoint, _hits) = spawn_endpoint().await;
    let mut flow = http_flow(endpoint);

    let attempt = flow.activate(Some("unknown-token")).await;
    assert_eq!(
        attempt.message.as_deref(),
        Some("Verification failed. The link may have expired.")
    );
}

#[tokio::test]
async fn test_non_json_failure_uses_fallback() {
    let (endpoint, _hits) = spawn_endpoint().await;
    let mut flow = http_flow(endpoint);

    let attempt = flow.activate(Some("plain-failure")).await;
    assert_eq!(attempt.status, VerificationStatus::Error);
    assert_eq!(
        attempt.message.as_deref(),
        Some("Verification failed. The link may have expired.")
    );
}

#[tokio::test]
async fn test_message_field_wins_over_error_field() {
    let (endpoint, _hits) = spawn_endpoint().await;
    let mut flow = http_flow(endpoint);

    let attempt = flow.activate(Some("framework-error")).await;
    assert_eq!(attempt.status, VerificationStatus::Error);
    assert_eq!(attempt.message.as_deref(), Some("Token expired"));
}

#[tokio::test]
async fn test_blank_or_non_string_error_field_keeps_message() {
    let (endpoint, _hits) = spawn_endpoint().await;

    for token in ["blank-error", "flag-error", "nested-error"] {
        let mut flow = http_flow(endpoint.clone());
        let attempt = flow.activate(Some(token)).await;
        assert_eq!(attempt.status, VerificationStatus::Error, "token {}", token);
        assert_eq!(attempt.message.as_deref(), Some("Token expired"), "token {}", token);
    }
}

#[tokio::test]
async fn test_oversized_failure_body_uses_fallback() {
    let (endpoint, _hits) = spawn_endpoint().await;
    let mut flow = http_flow(endpoint);

    let attempt = flow.activate(Some("huge-error")).await;
    assert_eq!(attempt.status, VerificationStatus::Error);
    assert_eq!(
        attempt.message.as_deref(),
        Some("Verification failed. The link may have expired.")
    );
}

#[tokio::test]
async fn test_unreachable_endpoint_is_reported_not_raised() {
    // Grab a free port and release it so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut flow = http_flow(format!("http://{}/auth/verify-email", addr));
    let attempt = flow.activate(Some("good-token")).await;

    assert_eq!(attempt.status, VerificationStatus::Error);
    assert_eq!(
        attempt.message.as_deref(),
        Some("Verification failed. The link may have expired.")
    );
}

#[tokio::test]
async fn test_missing_token_never_reaches_endpoint() {
    let (endpoint, hits) = spawn_endpoint().await;
    let mut flow = http_flow(endpoint);

    let attempt = flow.activate(None).await;
    assert_eq!(attempt.message.as_deref(), Some("Invalid verification link"));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rerender_with_same_token_hits_endpoint_once() {
    let (endpoint, hits) = spawn_endpoint().await;
    let mut flow = http_flow(endpoint);

    for _ in 0..3 {
        flow.activate(Some("good-token")).await;
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

/// Always accepts, without touching the network
struct AcceptAll;

#[async_trait]
impl VerificationApi for AcceptAll {
    async fn verify(&self, _token: &str) -> guildgate_common::Result<()> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_navigates_to_login_after_exactly_three_seconds() {
    let (navigator, mut rx) = ChannelNavigator::new();
    let mut flow = VerificationFlow::new(Arc::new(AcceptAll), "/login")
        .with_navigator(Arc::new(navigator));

    let start = Instant::now();
    flow.activate(Some("abc")).await;

    tokio::time::sleep(Duration::from_millis(2999)).await;
    assert!(rx.try_recv().is_err());

    assert_eq!(rx.recv().await.as_deref(), Some("/login"));
    assert_eq!(start.elapsed(), Duration::from_millis(3000));
}

#[tokio::test(start_paused = true)]
async fn test_teardown_cancels_pending_redirect() {
    let (navigator, mut rx) = ChannelNavigator::new();
    let mut flow = VerificationFlow::new(Arc::new(AcceptAll), "/login")
        .with_navigator(Arc::new(navigator));

    flow.activate(Some("abc")).await;
    tokio::time::sleep(Duration::from_millis(1500)).await;
    flow.teardown();

    tokio::time::sleep(Duration::from_millis(5000)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_new_token_replaces_pending_redirect() {
    let (navigator, mut rx) = ChannelNavigator::new();
    let mut flow = VerificationFlow::new(Arc::new(AcceptAll), "/login")
        .with_navigator(Arc::new(navigator));

    let start = Instant::now();
    flow.activate(Some("first")).await;
    tokio::time::sleep(Duration::from_millis(1000)).await;
    flow.activate(Some("second")).await;

    assert_eq!(rx.recv().await.as_deref(), Some("/login"));
    assert_eq!(start.elapsed(), Duration::from_millis(4000));

    tokio::time::sleep(Duration::from_millis(5000)).await;
    assert!(rx.try_recv().is_err());
}
