use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::Response,
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::{
    db::{POSTS, PRODUCTS},
    error::{AppError, AppResult},
    handlers::{listing, products},
    models::ProductFilters,
    query::{foreign_key_for, posts_by_user, related},
    AppState,
};

const USERS: &str = "users";

// ── List ──────────────────────────────────────────────────────────────────────

/// Only `products` interprets the query string; other collections ignore it.
pub async fn list_records(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    uri: Uri,
) -> AppResult<Response> {
    if collection == PRODUCTS {
        let Query(filters) = Query::<ProductFilters>::try_from_uri(&uri)
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        return products::list_products(&state, filters).await;
    }

    let records = state.store.read().await.collection(&collection)?.to_vec();
    info!(collection = %collection, count = records.len(), "Listed records");
    Ok(listing(records))
}

/// `GET /api/:collection/:id/:child`: child records pointing at one parent,
/// e.g. `/api/users/1/posts`.
pub async fn list_related(
    State(state): State<AppState>,
    Path((collection, id, child)): Path<(String, String, String)>,
) -> AppResult<Response> {
    let store = state.store.read().await;
    store.find(&collection, &id)?;
    let children = store.collection(&child)?;

    let records = match (collection.as_str(), child.as_str()) {
        (USERS, POSTS) => posts_by_user(children, &id),
        _ => related(children, &foreign_key_for(&collection), &id),
    };
    drop(store);

    info!(
        collection = %collection,
        id = %id,
        child = %child,
        count = records.len(),
        "Listed related records"
    );
    Ok(listing(records))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_record(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Json(payload): Json<Value>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let record = state.store.write().await.insert(&collection, payload)?;
    info!(collection = %collection, id = %record["id"], "Created record");
    Ok((StatusCode::CREATED, Json(record)))
}

// ── Get by ID ─────────────────────────────────────────────────────────────────

pub async fn get_record(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    let record = state.store.read().await.find(&collection, &id)?.clone();
    Ok(Json(record))
}

// ── Update ────────────────────────────────────────────────────────────────────

pub async fn replace_record(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    Json(payload): Json<Value>,
) -> AppResult<Json<Value>> {
    let record = state.store.write().await.replace(&collection, &id, payload)?;
    info!(collection = %collection, id = %id, "Replaced record");
    Ok(Json(record))
}

pub async fn patch_record(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    Json(payload): Json<Value>,
) -> AppResult<Json<Value>> {
    let record = state.store.write().await.patch(&collection, &id, payload)?;
    info!(collection = %collection, id = %id, "Patched record");
    Ok(Json(record))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_record(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    let record = state.store.write().await.remove(&collection, &id)?;
    info!(collection = %collection, id = %id, "Deleted record");
    Ok(Json(record))
}
