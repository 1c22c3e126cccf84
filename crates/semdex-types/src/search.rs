//! Similarity search request and result types.

use serde::{Deserialize, Serialize};

use crate::embedding::ItemKey;
use crate::error::SearchError;

/// What to search for: raw text, a previously stored item, or both.
///
/// When both are present the text builds the query vector and the item
/// reference is only used for self-exclusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: Option<String>,
    reference: Option<ItemKey>,
}

impl SearchQuery {
    /// Build a query from the optional parts a caller supplied.
    ///
    /// Empty or whitespace-only strings count as absent. A reference needs
    /// both `item_type` and `item_id`.
    pub fn new(
        text: Option<String>,
        item_type: Option<String>,
        item_id: Option<String>,
    ) -> Result<Self, SearchError> {
        let text = text.filter(|t| !t.trim().is_empty());
        let item_type = item_type.filter(|s| !s.trim().is_empty());
        let item_id = item_id.filter(|s| !s.trim().is_empty());

        let reference = match (item_type, item_id) {
            (Some(item_type), Some(item_id)) => Some(ItemKey { item_type, item_id }),
            (None, None) => None,
            _ => return Err(SearchError::IncompleteReference),
        };

        if text.is_none() && reference.is_none() {
            return Err(SearchError::NoQuery);
        }

        Ok(Self { text, reference })
    }

    /// Query by raw text.
    pub fn by_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            reference: None,
        }
    }

    /// Query by a previously stored item.
    pub fn by_item(key: ItemKey) -> Self {
        Self {
            text: None,
            reference: Some(key),
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn reference(&self) -> Option<&ItemKey> {
        self.reference.as_ref()
    }
}

/// A validated-on-use search request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: SearchQuery,
    /// Requested result count. Signed so that negative caller input reaches
    /// validation instead of failing to parse.
    pub top_k: i64,
    /// Drop the referenced item from its own results.
    pub exclude_self: bool,
}

impl SearchRequest {
    pub fn new(query: SearchQuery, top_k: i64) -> Self {
        Self {
            query,
            top_k,
            exclude_self: true,
        }
    }

    pub fn with_exclude_self(mut self, exclude_self: bool) -> Self {
        self.exclude_self = exclude_self;
        self
    }
}

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarItem {
    pub item_type: String,
    pub item_id: String,
    /// Cosine similarity in [-1, 1].
    pub score: f32,
    /// Source text truncated for display.
    pub text: String,
}

/// Ranked search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SimilarItem>,
    pub total_found: usize,
}

impl SearchResponse {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_results(results: Vec<SimilarItem>) -> Self {
        let total_found = results.len();
        Self {
            results,
            total_found,
        }
    }
}
