//! Integration tests: the HTTP surface end to end over a real socket.
use permission_ledger::config::ServiceConfig;
use permission_ledger::ipc::{self, CREATOR_HEADER};
use permission_ledger::models::{status_reasons, ServiceResponse};
use permission_ledger::state::AppState;
use permission_ledger::InMemoryGrantStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Start a server on an ephemeral port and return its base URL.
async fn spawn_server() -> String {
    let state = AppState::with_store(ServiceConfig::default(), Arc::new(InMemoryGrantStore::new()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        ipc::serve(listener, state).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn call(
    client: &reqwest::Client,
    method: reqwest::Method,
    url: String,
    creator: Option<&str>,
    body: Value,
) -> (u16, ServiceResponse) {
    let mut request = client.request(method, url).json(&body);
    if let Some(creator) = creator {
        request = request.header(CREATOR_HEADER, creator);
    }

    let response = request.send().await.unwrap();
    let status = response.status().as_u16();
    let body: ServiceResponse = response.json().await.unwrap();
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let base = spawn_server().await;

    let body: Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "permission-ledger");
}

#[tokio::test]
async fn test_give_has_get_lose_roundtrip() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();
    let api = format!("{}/api/v1/permission", base);

    let (status, body) = call(
        &client,
        reqwest::Method::POST,
        format!("{}/give", api),
        Some("Gateway"),
        json!({ "identity": 7, "service": "billing", "permissions": ["invoice:{id}:read", "pay"], "data": { "id": 12 } }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body.data, Some(json!({ "permissions": ["invoice:12:read", "pay"] })));

    let (status, body) = call(
        &client,
        reqwest::Method::POST,
        format!("{}/give", api),
        Some("gateway"),
        json!({ "identity": 7, "service": "billing", "permissions": ["pay"] }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body.status_reason, status_reasons::PERMISSIONS_ALREADY_GIVEN);

    let (status, body) = call(
        &client,
        reqwest::Method::POST,
        format!("{}/has", api),
        Some("gateway"),
        json!({ "identity": 7, "service": "billing", "permissions": ["invoice:12:read", "refund"] }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(
        body.data,
        Some(json!({
            "has": false,
            "permissions": [
                { "permission": "invoice:12:read", "has": true },
                { "permission": "refund", "has": false }
            ]
        }))
    );

    let (status, body) = call(
        &client,
        reqwest::Method::DELETE,
        format!("{}/lose", api),
        Some("gateway"),
        json!({ "identity": 7, "service": "billing", "permissions": ["pay", "refund"] }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body.status_reason, status_reasons::PERMISSIONS_LOST);

    let (status, body) = call(
        &client,
        reqwest::Method::POST,
        format!("{}/get", api),
        Some("gateway"),
        json!({ "identity": 7, "service": "billing" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body.data, Some(json!(["invoice:12:read"])));
    assert_eq!(body.meta, Some(json!({ "total": 1 })));
}

#[tokio::test]
async fn test_missing_creator_header() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let (status, body) = call(
        &client,
        reqwest::Method::POST,
        format!("{}/api/v1/permission/get", base),
        None,
        json!({ "identity": 7, "service": "billing" }),
    )
    .await;

    assert_eq!(status, 401);
    assert_eq!(body.status_reason, status_reasons::CREATOR_REQUIRED);
}

#[tokio::test]
async fn test_invalid_payloads_are_422() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let (status, body) = call(
        &client,
        reqwest::Method::POST,
        format!("{}/api/v1/permission/give", base),
        Some("gateway"),
        json!({ "identity": 0, "service": "billing", "permissions": ["a"] }),
    )
    .await;
    assert_eq!(status, 422);
    assert_eq!(body.status_reason, status_reasons::VALIDATION_ERROR);

    let response = client
        .post(format!("{}/api/v1/permission/has", base))
        .header(CREATOR_HEADER, "gateway")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);
    let body: ServiceResponse = response.json().await.unwrap();
    assert_eq!(body.status_reason, status_reasons::VALIDATION_ERROR);

    let (status, body) = call(
        &client,
        reqwest::Method::POST,
        format!("{}/api/v1/permission/give", base),
        Some("gateway"),
        json!({ "identity": 1, "service": "billing", "permissions": ["{user}"] }),
    )
    .await;
    assert_eq!(status, 422);
    assert_eq!(body.status_reason, status_reasons::TEMPLATE_KEY_MISSING);
}
