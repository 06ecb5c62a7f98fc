//! HTTP server
//!
//! ## Routes
//!
//! ```text
//! GET    /health                     - health check
//! POST   /api/v1/permission/give     - grant permissions
//! DELETE /api/v1/permission/lose     - revoke permissions
//! POST   /api/v1/permission/has      - check permissions
//! POST   /api/v1/permission/get      - list permissions
//! ```
//!
//! The creator is taken from the `X-Creator` header, which the fronting
//! gateway sets after authenticating the caller.

use crate::models::{status_reasons, ServiceResponse};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::Value;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Header carrying the trusted creator identity
pub const CREATOR_HEADER: &str = "X-Creator";

/// Build the router over `state`.
pub fn router(state: AppState) -> Router {
    let permission_routes = Router::new()
        .route("/give", post(give_handler))
        .route("/lose", delete(lose_handler))
        .route("/has", post(has_handler))
        .route("/get", post(get_handler));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api/v1/permission", permission_routes)
        .with_state(state)
}

/// Bind `config.bind_address` and serve until the process stops.
pub async fn start(state: AppState) -> Result<(), String> {
    let addr: SocketAddr = state
        .config
        .bind_address
        .parse()
        .map_err(|e| format!("Invalid bind address '{}': {}", state.config.bind_address, e))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    println!("Permission ledger listening on http://{}", addr);
    println!("  Routes:");
    println!("    GET    /health");
    println!("    POST   /api/v1/permission/give");
    println!("    DELETE /api/v1/permission/lose");
    println!("    POST   /api/v1/permission/has");
    println!("    POST   /api/v1/permission/get");

    serve(listener, state).await
}

/// Serve on an already bound listener.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), String> {
    axum::serve(listener, router(state))
        .await
        .map_err(|e| format!("Server error: {}", e))
}

fn extract_creator(headers: &HeaderMap) -> &str {
    headers
        .get(CREATOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn reply(response: ServiceResponse) -> (StatusCode, Json<ServiceResponse>) {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response))
}

async fn dispatch(
    state: &AppState,
    operation: &str,
    headers: &HeaderMap,
    body: &[u8],
) -> (StatusCode, Json<ServiceResponse>) {
    let creator = extract_creator(headers);

    let response = match serde_json::from_slice::<Value>(body) {
        Ok(payload) => state.service.handle(operation, creator, payload).await,
        Err(e) => ServiceResponse::error(
            422,
            status_reasons::VALIDATION_ERROR,
            format!("Invalid JSON body: {}", e),
        ),
    };

    reply(response)
}

async fn health_handler() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "permission-ledger",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn give_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<ServiceResponse>) {
    dispatch(&state, "give", &headers, &body).await
}

async fn lose_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<ServiceResponse>) {
    dispatch(&state, "lose", &headers, &body).await
}

async fn has_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<ServiceResponse>) {
    dispatch(&state, "has", &headers, &body).await
}

async fn get_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<ServiceResponse>) {
    dispatch(&state, "get", &headers, &body).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_creator() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_creator(&headers), "");

        headers.insert(CREATOR_HEADER, HeaderValue::from_static("Alice"));
        assert_eq!(extract_creator(&headers), "Alice");
    }

    #[test]
    fn test_reply_mirrors_status_code() {
        let (status, _) = reply(ServiceResponse::new(400, status_reasons::PERMISSIONS_ALREADY_GIVEN));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = reply(ServiceResponse::internal("boom"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
