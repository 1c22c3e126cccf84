//! Similarity search handler.
//!
//! POST /api/v1/search - Rank stored items by similarity to text or to a
//! stored item.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use semdex_types::search::{SearchQuery, SearchRequest, SearchResponse};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// Request body for a similarity search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchBody {
    pub text: Option<String>,
    pub item_type: Option<String>,
    pub item_id: Option<String>,
    /// Defaults to `search.default_top_k`.
    pub top_k: Option<i64>,
    /// Defaults to true.
    pub exclude_self: Option<bool>,
}

/// POST /api/v1/search
pub async fn search(
    State(state): State<AppState>,
    Json(body): Json<SearchBody>,
) -> Result<Json<ApiResponse<SearchResponse>>, AppError> {
    let timer = RequestTimer::start();

    let query = SearchQuery::new(body.text, body.item_type, body.item_id)?;
    let top_k = body.top_k.unwrap_or(state.config.search.default_top_k);
    let request =
        SearchRequest::new(query, top_k).with_exclude_self(body.exclude_self.unwrap_or(true));

    let response = state.index.search(&request).await?;

    Ok(Json(timer.respond(response)))
}
