pub mod collections;
pub mod products;

use axum::{
    extract::State,
    http::{HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::AppState;

/// Number of records in a list response, before any client-side paging.
pub const X_TOTAL_COUNT: HeaderName = HeaderName::from_static("x-total-count");

/// JSON array response carrying `X-Total-Count`.
pub fn listing<T: Serialize>(items: Vec<T>) -> Response {
    (
        StatusCode::OK,
        [(X_TOTAL_COUNT, items.len().to_string())],
        Json(items),
    )
        .into_response()
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let store = state.store.read().await;
    let collections: Map<String, Value> = store
        .summary()
        .into_iter()
        .map(|(name, count)| (name.to_string(), json!(count)))
        .collect();

    let (status, label) = if store.is_available() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(json!({ "status": label, "service": "mock-api", "collections": collections })),
    )
}
