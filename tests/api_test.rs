//! HTTP API 测试（不监听端口，直接驱动 Router）

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::*;
use iqbridge::{api, app_state::AppState, domain::WalletSession};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(session: WalletSession) -> Router {
    let state = AppState::new(Arc::new(test_config()), session).unwrap();
    api::routes(Arc::new(state))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("X-Trace-Id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, trace_id, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_healthz_sets_trace_header() {
    let (status, trace_id, body) = send(app(WalletSession::disconnected()), get("/healthz")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(trace_id.is_some());
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["wallet_status"], "disconnected");
}

#[tokio::test]
async fn test_session_reports_network_mismatch() {
    let session = WalletSession::errored(Some(account()), Some(1));
    let (status, _, body) = send(app(session), get("/api/session")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "error");
    assert_eq!(body["data"]["expected_chain_id"], 137);
    assert_eq!(body["data"]["network_mismatch"], true);
    assert_eq!(body["data"]["submission_status"], "idle");
}

#[tokio::test]
async fn test_balances_for_disconnected_wallet() {
    let (status, _, body) = send(app(WalletSession::disconnected()), get("/api/balances")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"iq": "0", "hiiq": "0", "piq": "0"}));
}

#[tokio::test]
async fn test_balances_from_chain() {
    let client = MockChainClient::new();
    client.set_balance(polygon().iq_token, tokens(12));
    let (status, _, body) = send(app(connected_session(&client)), get("/api/balances")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["iq"], "12.0");
}

#[tokio::test]
async fn test_lock_estimate() {
    let (status, _, body) = send(
        app(WalletSession::disconnected()),
        get("/api/lock/estimate?amount=100&days=1460"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["estimated_hiiq"], "400");
    assert_eq!(body["data"]["multiplier"], "4");
    assert!(body["data"]["unlock_time"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_lock_estimate_rejects_bad_period() {
    let (status, trace_id, body) = send(
        app(WalletSession::disconnected()),
        get("/api/lock/estimate?amount=100&days=0"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_lock_period");
    assert_eq!(body["trace_id"].as_str(), trace_id.as_deref());
}

#[tokio::test]
async fn test_lock_estimate_rejects_overflowing_amount() {
    let (status, trace_id, body) = send(
        app(WalletSession::disconnected()),
        get("/api/lock/estimate?amount=70000000000000000000000000000&days=1460"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_amount");
    assert_eq!(body["trace_id"].as_str(), trace_id.as_deref());
}

#[tokio::test]
async fn test_lock_requires_connected_wallet() {
    let req = Request::builder()
        .method("POST")
        .uri("/api/lock")
        .header("content-type", "application/json")
        .header("X-Trace-Id", "trace-123")
        .body(Body::from(json!({"amount": "1", "days": 7}).to_string()))
        .unwrap();
    let (status, trace_id, body) = send(app(WalletSession::disconnected()), req).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(trace_id.as_deref(), Some("trace-123"));
    assert_eq!(body["code"], "wallet_disconnected");
    assert_eq!(body["trace_id"], "trace-123");
}

#[tokio::test]
async fn test_convert_returns_outcome() {
    let client = MockChainClient::new();
    let (status, _, body) = send(
        app(connected_session(&client)),
        post("/api/convert", json!({"amount": "1.5"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["action"], "convert");
    assert_eq!(body["data"]["amount"], "1.5");
    assert!(body["data"]["action_tx_hash"]
        .as_str()
        .unwrap()
        .starts_with("0x"));
    assert_eq!(client.sent().len(), 2);
}

#[tokio::test]
async fn test_increase_maps_rejection_to_bad_gateway() {
    let client = MockChainClient::new();
    client.fail_on(iqbridge::domain::TxStep::IncreaseAmount);
    let (status, _, body) = send(
        app(connected_session(&client)),
        post("/api/lock/increase", json!({"amount": "1"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "transaction_rejected");
}

#[tokio::test]
async fn test_invalid_amount_is_bad_request() {
    let client = MockChainClient::new();
    let (status, _, body) = send(
        app(connected_session(&client)),
        post("/api/lock", json!({"amount": "abc", "days": 7})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_amount");
    assert!(client.untouched());
}

#[tokio::test]
async fn test_openapi_document() {
    let (status, _, body) = send(app(WalletSession::disconnected()), get("/api/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/lock"].is_object());
    assert!(body["paths"]["/api/convert"].is_object());
}

#[tokio::test]
async fn test_unknown_route_returns_error_body() {
    let (status, trace_id, body) = send(app(WalletSession::disconnected()), get("/api/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["trace_id"].as_str(), trace_id.as_deref());
}
