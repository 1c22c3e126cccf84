//! SQLite embedding store implementation.
//!
//! Implements `VectorStore` from `semdex-core` using sqlx with split read/write pools.
//! Vectors are stored as JSON arrays alongside their dimension and source text.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use semdex_core::repository::vector::VectorStore;
use semdex_types::embedding::{EmbeddingRecord, PurgeFilter};
use semdex_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `VectorStore`.
pub struct SqliteVectorStore {
    pool: DatabasePool,
}

impl SqliteVectorStore {
    /// Create a new vector store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct EmbeddingRow {
    item_type: String,
    item_id: String,
    vector: String,
    dimension: i64,
    source_text: String,
    created_at: String,
}

impl EmbeddingRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            item_type: row.try_get("item_type")?,
            item_id: row.try_get("item_id")?,
            vector: row.try_get("vector")?,
            dimension: row.try_get("dimension")?,
            source_text: row.try_get("source_text")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_record(self) -> Result<EmbeddingRecord, RepositoryError> {
        let vector = decode_vector(&self.vector, self.dimension)?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(EmbeddingRecord {
            item_type: self.item_type,
            item_id: self.item_id,
            vector,
            source_text: self.source_text,
            created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn encode_vector(vector: &[f32]) -> Result<String, RepositoryError> {
    serde_json::to_string(vector)
        .map_err(|e| RepositoryError::Query(format!("failed to serialize vector: {e}")))
}

fn decode_vector(s: &str, dimension: i64) -> Result<Vec<f32>, RepositoryError> {
    let vector: Vec<f32> = serde_json::from_str(s)
        .map_err(|e| RepositoryError::Query(format!("invalid vector: {e}")))?;
    if i64::try_from(vector.len()).ok() != Some(dimension) {
        return Err(RepositoryError::Query(format!(
            "vector length {} does not match recorded dimension {dimension}",
            vector.len()
        )));
    }
    Ok(vector)
}

fn query_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

// ---------------------------------------------------------------------------
// VectorStore implementation
// ---------------------------------------------------------------------------

impl VectorStore for SqliteVectorStore {
    async fn put(
        &self,
        item_type: &str,
        item_id: &str,
        vector: &[f32],
        source_text: &str,
    ) -> Result<(), RepositoryError> {
        let now = format_datetime(&Utc::now());
        let vector_json = encode_vector(vector)?;

        sqlx::query(
            r#"INSERT INTO embeddings (item_type, item_id, vector, dimension, source_text, created_at)
               VALUES (?, ?, ?, ?, ?, ?)
               ON CONFLICT (item_type, item_id) DO UPDATE SET
                   vector = excluded.vector,
                   dimension = excluded.dimension,
                   source_text = excluded.source_text,
                   created_at = excluded.created_at"#,
        )
        .bind(item_type)
        .bind(item_id)
        .bind(&vector_json)
        .bind(vector.len() as i64)
        .bind(source_text)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        Ok(())
    }

    async fn get_vector(
        &self,
        item_type: &str,
        item_id: &str,
    ) -> Result<Option<Vec<f32>>, RepositoryError> {
        let row = sqlx::query(
            "SELECT vector, dimension FROM embeddings WHERE item_type = ? AND item_id = ?",
        )
        .bind(item_type)
        .bind(item_id)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let vector: String = row.try_get("vector").map_err(query_err)?;
        let dimension: i64 = row.try_get("dimension").map_err(query_err)?;
        match decode_vector(&vector, dimension) {
            Ok(vector) => Ok(Some(vector)),
            Err(e) => {
                tracing::warn!(item_type, item_id, error = %e, "Unreadable stored vector");
                Ok(None)
            }
        }
    }

    async fn get_text(
        &self,
        item_type: &str,
        item_id: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query(
            "SELECT source_text FROM embeddings WHERE item_type = ? AND item_id = ?",
        )
        .bind(item_type)
        .bind(item_id)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_err)?;

        match row {
            Some(row) => Ok(Some(row.try_get("source_text").map_err(query_err)?)),
            None => Ok(None),
        }
    }

    async fn get_record(
        &self,
        item_type: &str,
        item_id: &str,
    ) -> Result<Option<EmbeddingRecord>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM embeddings WHERE item_type = ? AND item_id = ?")
            .bind(item_type)
            .bind(item_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let embedding_row = EmbeddingRow::from_row(&row).map_err(query_err)?;
        match embedding_row.into_record() {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(item_type, item_id, error = %e, "Unreadable stored record");
                Ok(None)
            }
        }
    }

    async fn scan_all(&self) -> Result<Vec<EmbeddingRecord>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM embeddings ORDER BY item_type, item_id")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_err)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let record = EmbeddingRow::from_row(row)
                .map_err(query_err)
                .and_then(EmbeddingRow::into_record);
            match record {
                Ok(record) => records.push(record),
                Err(e) => {
                    let item_type: String = row.try_get("item_type").unwrap_or_default();
                    let item_id: String = row.try_get("item_id").unwrap_or_default();
                    tracing::warn!(%item_type, %item_id, error = %e, "Skipping corrupt embedding record");
                }
            }
        }

        Ok(records)
    }

    async fn count_by_type(&self) -> Result<BTreeMap<String, u64>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT item_type, COUNT(*) AS count FROM embeddings GROUP BY item_type",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let mut counts = BTreeMap::new();
        for row in &rows {
            let item_type: String = row.try_get("item_type").map_err(query_err)?;
            let count: i64 = row.try_get("count").map_err(query_err)?;
            counts.insert(item_type, count as u64);
        }

        Ok(counts)
    }

    async fn total_count(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM embeddings")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_err)?;

        let count: i64 = row.try_get("count").map_err(query_err)?;
        Ok(count as u64)
    }

    async fn purge(&self, filter: &PurgeFilter) -> Result<u64, RepositoryError> {
        let query = match filter {
            PurgeFilter::All => sqlx::query("DELETE FROM embeddings"),
            PurgeFilter::ItemType(item_type) => {
                sqlx::query("DELETE FROM embeddings WHERE item_type = ?").bind(item_type)
            }
            PurgeFilter::IdPattern(pattern) => {
                sqlx::query("DELETE FROM embeddings WHERE item_id GLOB ?").bind(pattern)
            }
            PurgeFilter::ItemTypeAndIdPattern {
                item_type,
                id_pattern,
            } => sqlx::query("DELETE FROM embeddings WHERE item_type = ? AND item_id GLOB ?")
                .bind(item_type)
                .bind(id_pattern),
        };

        let result = query
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        Ok(result.rows_affected())
    }
}
