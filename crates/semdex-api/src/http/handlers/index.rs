//! Bulk indexing handler.
//!
//! POST /api/v1/index - Embed and store a batch of items of one type.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use semdex_types::embedding::{BulkIndexReport, IndexItem, IndexOptions};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// Request body for bulk indexing.
#[derive(Debug, Deserialize)]
pub struct IndexBody {
    pub item_type: String,
    pub items: Vec<IndexItem>,
    /// Re-embed items that are already stored.
    #[serde(default)]
    pub force: bool,
    /// Purge the item type before indexing.
    #[serde(default)]
    pub clear: bool,
}

/// POST /api/v1/index
pub async fn index_items(
    State(state): State<AppState>,
    Json(body): Json<IndexBody>,
) -> Result<Json<ApiResponse<BulkIndexReport>>, AppError> {
    let timer = RequestTimer::start();

    let options = IndexOptions {
        force: body.force,
        clear_first: body.clear,
    };
    let report = state
        .index
        .index_items(&body.item_type, &body.items, options)
        .await?;

    Ok(Json(timer.respond(report)))
}
