//! Bulk indexing of externally-owned items.

use semdex_types::embedding::{BulkIndexReport, IndexItem, IndexOptions, PurgeFilter};
use semdex_types::error::IndexError;

use crate::repository::vector::VectorStore;

use super::index::{SimilarityIndex, validate_key};

/// Progress is logged after every this many items.
const PROGRESS_INTERVAL: usize = 10;

impl<S: VectorStore> SimilarityIndex<S> {
    /// Embed and store a batch of items of one type.
    ///
    /// Items with a blank id, or whose write fails, are counted as failed
    /// and the run continues. Unless `options.force` is set, items that
    /// already have a stored vector are skipped.
    pub async fn index_items(
        &self,
        item_type: &str,
        items: &[IndexItem],
        options: IndexOptions,
    ) -> Result<BulkIndexReport, IndexError> {
        if item_type.trim().is_empty() {
            return Err(IndexError::Validation("item_type cannot be empty".to_string()));
        }

        if options.clear_first {
            let cleared = self
                .store
                .purge(&PurgeFilter::ItemType(item_type.to_string()))
                .await?;
            tracing::info!(item_type, cleared, "Cleared existing embeddings");
        }

        tracing::info!(item_type, total = items.len(), force = options.force, "Indexing items");

        let mut report = BulkIndexReport::default();
        for (i, item) in items.iter().enumerate() {
            if validate_key(item_type, &item.id).is_err() {
                tracing::warn!(item_type, position = i, "Skipping item with empty id");
                report.failed += 1;
                continue;
            }

            if !options.force && !options.clear_first {
                match self.store.get_vector(item_type, &item.id).await {
                    Ok(Some(_)) => {
                        report.skipped += 1;
                        continue;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(item_type, item_id = %item.id, error = %e, "Existence check failed, re-embedding");
                    }
                }
            }

            match self.store_embedding(item_type, &item.id, &item.text).await {
                Ok(true) => report.indexed += 1,
                Ok(false) | Err(_) => report.failed += 1,
            }

            if (i + 1) % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    item_type,
                    processed = i + 1,
                    total = items.len(),
                    "Indexing progress"
                );
            }
        }

        tracing::info!(
            item_type,
            indexed = report.indexed,
            skipped = report.skipped,
            failed = report.failed,
            "Indexing complete"
        );

        Ok(report)
    }
}
