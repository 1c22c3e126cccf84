//! Embedding record types for semdex.
//!
//! An embedding record is the unit of storage: a vector derived from a piece
//! of source text, keyed uniquely by `(item_type, item_id)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;
use std::fmt;

/// Unique key of a stored embedding.
///
/// `item_type` is a free-form category tag (e.g. "summary", "task") and
/// `item_id` is an opaque caller-supplied identifier, unique within its type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub item_type: String,
    pub item_id: String,
}

impl ItemKey {
    pub fn new(item_type: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            item_id: item_id.into(),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.item_type, self.item_id)
    }
}

/// A stored embedding with its source text.
///
/// Records are only ever created or replaced as a whole; there is no
/// in-place mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub item_type: String,
    pub item_id: String,
    pub vector: Vec<f32>,
    /// The text the vector was derived from.
    pub source_text: String,
    /// Timestamp of the last write.
    pub created_at: DateTime<Utc>,
}

impl EmbeddingRecord {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(&self.item_type, &self.item_id)
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// Which strategy produced a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingSource {
    /// The configured embedder answered.
    Primary,
    /// The configured embedder failed and the hashing vector was used.
    Fallback,
}

/// A generated embedding vector tagged with the strategy that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub source: EmbeddingSource,
}

/// One externally-owned item handed to bulk indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexItem {
    pub id: String,
    pub text: String,
}

/// Options for a bulk indexing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Re-embed items that already have a stored vector.
    #[serde(default)]
    pub force: bool,
    /// Purge every record of the item type before indexing.
    #[serde(default)]
    pub clear_first: bool,
}

/// Outcome counts of a bulk indexing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkIndexReport {
    /// Items embedded and stored.
    pub indexed: u64,
    /// Items already present and left untouched.
    pub skipped: u64,
    /// Items that could not be stored.
    pub failed: u64,
}

impl BulkIndexReport {
    pub fn total(&self) -> u64 {
        self.indexed + self.skipped + self.failed
    }
}

/// Aggregate statistics over the embedding store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_embeddings: u64,
    pub by_type: BTreeMap<String, u64>,
}

/// Selection of records for an administrative purge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurgeFilter {
    /// Every record.
    All,
    /// Every record of one item type.
    ItemType(String),
    /// Records whose item_id matches a glob pattern (`*` and `?`), any type.
    IdPattern(String),
    /// Records of one item type whose item_id matches a glob pattern.
    ItemTypeAndIdPattern { item_type: String, id_pattern: String },
}

impl PurgeFilter {
    /// Build a filter from optional type and id-pattern parts.
    pub fn from_parts(item_type: Option<String>, id_pattern: Option<String>) -> Self {
        let item_type = item_type.filter(|s| !s.is_empty());
        let id_pattern = id_pattern.filter(|s| !s.is_empty());
        match (item_type, id_pattern) {
            (None, None) => PurgeFilter::All,
            (Some(item_type), None) => PurgeFilter::ItemType(item_type),
            (None, Some(id_pattern)) => PurgeFilter::IdPattern(id_pattern),
            (Some(item_type), Some(id_pattern)) => PurgeFilter::ItemTypeAndIdPattern {
                item_type,
                id_pattern,
            },
        }
    }
}

impl fmt::Display for PurgeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurgeFilter::All => write!(f, "all embeddings"),
            PurgeFilter::ItemType(t) => write!(f, "item_type '{t}'"),
            PurgeFilter::IdPattern(p) => write!(f, "item_id matching '{p}'"),
            PurgeFilter::ItemTypeAndIdPattern {
                item_type,
                id_pattern,
            } => write!(f, "item_type '{item_type}' with item_id matching '{id_pattern}'"),
        }
    }
}
