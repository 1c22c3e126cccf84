//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Embedding records
        .route(
            "/embeddings",
            post(handlers::embedding::store_embedding)
                .delete(handlers::embedding::purge_embeddings),
        )
        .route("/embeddings/stats", get(handlers::stats::get_stats))
        .route(
            "/embeddings/{item_type}/{item_id}",
            get(handlers::embedding::get_embedding),
        )
        // Similarity search
        .route("/search", post(handlers::search::search))
        // Bulk indexing
        .route("/index", post(handlers::index::index_items))
        .route("/health", get(health_check));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /api/v1/health - Liveness plus the active embedding strategy.
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let generator = state.index.generator();
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "embedder": generator.model_name(),
        "dimension": generator.dimension(),
    }))
}
