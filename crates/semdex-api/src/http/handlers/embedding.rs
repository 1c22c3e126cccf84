//! Embedding record handlers for the REST API.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use semdex_types::embedding::PurgeFilter;

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// Request body for storing an embedding.
#[derive(Debug, Deserialize)]
pub struct StoreEmbeddingRequest {
    pub item_type: String,
    pub item_id: String,
    pub text: String,
}

/// Query parameters for a purge.
#[derive(Debug, Default, Deserialize)]
pub struct PurgeQuery {
    pub item_type: Option<String>,
    pub id_pattern: Option<String>,
}

/// POST /api/v1/embeddings - Embed text and upsert it under its key.
pub async fn store_embedding(
    State(state): State<AppState>,
    Json(body): Json<StoreEmbeddingRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let timer = RequestTimer::start();

    let stored = state
        .index
        .store_embedding(&body.item_type, &body.item_id, &body.text)
        .await?;

    let resp = timer
        .respond(serde_json::json!({ "stored": stored }))
        .with_link(
            "self",
            &format!("/api/v1/embeddings/{}/{}", body.item_type, body.item_id),
        );

    Ok(Json(resp))
}

/// GET /api/v1/embeddings/{item_type}/{item_id} - Record summary.
pub async fn get_embedding(
    State(state): State<AppState>,
    Path((item_type, item_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let timer = RequestTimer::start();

    let record = state
        .index
        .get_record(&item_type, &item_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No embedding for {item_type}/{item_id}")))?;

    let data = serde_json::json!({
        "item_type": record.item_type,
        "item_id": record.item_id,
        "dimension": record.dimension(),
        "text": record.source_text,
        "created_at": record.created_at.to_rfc3339(),
    });

    Ok(Json(timer.respond(data)))
}

/// DELETE /api/v1/embeddings - Purge by item type and/or id glob pattern.
///
/// With no parameters every record is deleted.
pub async fn purge_embeddings(
    State(state): State<AppState>,
    Query(query): Query<PurgeQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let timer = RequestTimer::start();

    let filter = PurgeFilter::from_parts(query.item_type, query.id_pattern);
    let deleted = state.index.purge(&filter).await?;

    Ok(Json(timer.respond(serde_json::json!({ "deleted": deleted }))))
}
