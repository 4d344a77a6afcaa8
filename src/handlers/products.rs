use std::time::Instant;

use axum::response::Response;
use tracing::info;

use crate::{
    error::AppResult,
    handlers::listing,
    models::ProductFilters,
    query::{self, ProductQuery},
    AppState,
};

// ── List ──────────────────────────────────────────────────────────────────────

/// `GET /api/products`: filtered and sorted through the query engine.
pub async fn list_products(state: &AppState, filters: ProductFilters) -> AppResult<Response> {
    let start = Instant::now();
    // Typed copy; the read lock is released before the engine runs.
    let products = state.store.read().await.products()?;
    let query = ProductQuery::from(filters);
    let result = query::run(&products, &query);
    let elapsed = start.elapsed();

    info!(
        count = result.len(),
        total = products.len(),
        category = query.category.as_deref().unwrap_or("all"),
        availability = ?query.availability,
        sort_by = ?query.sort_by,
        elapsed_us = elapsed.as_micros() as u64,
        "Listed products"
    );

    Ok(listing(result))
}
