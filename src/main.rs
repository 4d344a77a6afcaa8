use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tokio::sync::RwLock;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod query;
mod seed;

use crate::config::Config;
use crate::db::CollectionStore;
use crate::handlers::collections;
use crate::middleware::{simulate_latency, Latency};

/// Shared application state — cheap to clone (all heap behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<CollectionStore>>,
}

impl AppState {
    pub fn new(store: CollectionStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,mock_api=debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Mock API  — Rust + Axum             ║");
    info!("║  JSON collections · query engine     ║");
    info!("╚══════════════════════════════════════╝");

    let store = open_store(&config).await;
    for (name, count) in store.summary() {
        info!(collection = name, records = count, "Collection ready");
    }

    let app = build_router(AppState::new(store), &config);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening on http://{}", addr);
    if config.latency_enabled() {
        info!(
            delay_ms = config.delay_ms,
            jitter_ms = config.delay_jitter_ms,
            "Simulated latency enabled"
        );
    }
    info!(
        "Quick-start: GET http://{}/api/products?availability=on-sale&sortBy=price-low",
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Loads `DB_PATH`, or the generated demo dataset when the file is absent.
/// A file that exists but cannot be read yields an unavailable store so the
/// failure is reported per request instead of aborting startup.
async fn open_store(config: &Config) -> CollectionStore {
    let path = &config.db_path;
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        warn!(path = %path.display(), "Database file not found, serving generated demo data");
        return CollectionStore::from_value(seed::demo_document(config.seed_count))
            .unwrap_or_else(|err| CollectionStore::unavailable(err.to_string()));
    }

    match CollectionStore::load(path).await {
        Ok(store) => store,
        Err(err) => {
            error!(path = %path.display(), error = %err, "Failed to load database");
            CollectionStore::unavailable(format!("{}: {}", path.display(), err))
        }
    }
}

fn build_router(state: AppState, config: &Config) -> Router {
    let mut router = Router::new()
        // ── Health ──────────────────────────────────────────────────────────
        .route("/health", get(handlers::health))

        // ── Collections ─────────────────────────────────────────────────────
        .route(
            "/api/:collection",
            get(collections::list_records).post(collections::create_record),
        )
        .route(
            "/api/:collection/:id",
            get(collections::get_record)
                .put(collections::replace_record)
                .patch(collections::patch_record)
                .delete(collections::delete_record),
        )
        .route(
            "/api/:collection/:id/:child",
            get(collections::list_related),
        );

    // ── Middleware ──────────────────────────────────────────────────────────
    if config.latency_enabled() {
        router = router.layer(from_fn_with_state(
            Latency::new(config.delay_ms, config.delay_jitter_ms),
            simulate_latency,
        ));
    }

    router
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([handlers::X_TOTAL_COUNT])
}
