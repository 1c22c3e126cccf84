//! Index statistics endpoint.
//!
//! GET /api/v1/embeddings/stats - Record counts in total and per item type.

use axum::Json;
use axum::extract::State;

use semdex_types::embedding::IndexStats;

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// GET /api/v1/embeddings/stats
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<IndexStats>>, AppError> {
    let timer = RequestTimer::start();

    let stats = state.index.stats().await?;

    Ok(Json(
        timer
            .respond(stats)
            .with_link("self", "/api/v1/embeddings/stats"),
    ))
}
