//! Vector store trait.
//!
//! Defines the storage port for embedding records keyed by
//! `(item_type, item_id)`. Implementations (e.g. SQLite) live in semdex-infra.

use std::collections::BTreeMap;

use semdex_types::embedding::{EmbeddingRecord, PurgeFilter};
use semdex_types::error::RepositoryError;

/// Trait for durable keyed storage of embedding vectors.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in semdex-infra.
pub trait VectorStore: Send + Sync {
    /// Write or replace the record for `(item_type, item_id)`.
    ///
    /// Must be atomic per key: concurrent writers to the same key never
    /// leave a half-written record behind.
    fn put(
        &self,
        item_type: &str,
        item_id: &str,
        vector: &[f32],
        source_text: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Point lookup of a stored vector. Unreadable vectors count as absent.
    fn get_vector(
        &self,
        item_type: &str,
        item_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<f32>>, RepositoryError>> + Send;

    /// Point lookup of the stored source text.
    fn get_text(
        &self,
        item_type: &str,
        item_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Point lookup of the full record. Unreadable records count as absent.
    fn get_record(
        &self,
        item_type: &str,
        item_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<EmbeddingRecord>, RepositoryError>> + Send;

    /// Every readable record, ordered by `(item_type, item_id)`.
    ///
    /// Corrupt records are skipped (and logged) instead of failing the scan.
    fn scan_all(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<EmbeddingRecord>, RepositoryError>> + Send;

    /// Number of records per item type.
    fn count_by_type(
        &self,
    ) -> impl std::future::Future<Output = Result<BTreeMap<String, u64>, RepositoryError>> + Send;

    /// Total number of records.
    fn total_count(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Administrative bulk delete. Returns the number of deleted records.
    fn purge(
        &self,
        filter: &PurgeFilter,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
