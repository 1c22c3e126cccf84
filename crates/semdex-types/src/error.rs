use thiserror::Error;

/// Errors from repository operations (used by trait definitions in semdex-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors raised at the external embedding-model boundary.
///
/// These never reach callers of the embedding generator: every variant is
/// recovered by falling back to the hashing strategy.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding model unavailable: {0}")]
    Unavailable(String),

    #[error("embedding model timed out after {0} ms")]
    Timeout(u64),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding model error: {0}")]
    Model(String),
}

/// Errors related to similarity search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("either text or an item reference (item_type + item_id) must be provided")]
    NoQuery,

    #[error("item reference requires both item_type and item_id")]
    IncompleteReference,

    #[error("top_k must be between 1 and {max}, got {requested}")]
    InvalidTopK { requested: i64, max: usize },

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

impl SearchError {
    /// Whether this error is the caller's fault (a 4xx-equivalent).
    pub fn is_validation(&self) -> bool {
        !matches!(self, SearchError::Storage(_))
    }
}

/// Errors related to storing and bulk-indexing embeddings.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}
