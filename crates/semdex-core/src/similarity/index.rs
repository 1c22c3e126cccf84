//! Similarity index service.
//!
//! Orchestrates embedding generation, storage through a [`VectorStore`], and
//! brute-force top-K retrieval by cosine similarity. Generic over the store
//! so the service never depends on a concrete database.

use semdex_types::config::SearchConfig;
use semdex_types::embedding::{EmbeddingRecord, EmbeddingSource, IndexStats, ItemKey, PurgeFilter};
use semdex_types::error::{IndexError, RepositoryError, SearchError};
use semdex_types::search::{SearchQuery, SearchRequest, SearchResponse};

use crate::embedding::generator::EmbeddingGenerator;
use crate::repository::vector::VectorStore;

use super::cosine::cosine_similarity;
use super::rank::{self, ScoredCandidate};

/// Embedding store plus ranked nearest-neighbour search.
pub struct SimilarityIndex<S: VectorStore> {
    pub(super) store: S,
    pub(super) generator: EmbeddingGenerator,
    config: SearchConfig,
}

impl<S: VectorStore> SimilarityIndex<S> {
    /// Create a new SimilarityIndex.
    ///
    /// - `store`: persistence for embedding records
    /// - `generator`: text-to-vector strategy for this deployment
    /// - `config`: top-K bounds and display settings
    pub fn new(store: S, generator: EmbeddingGenerator, config: SearchConfig) -> Self {
        Self {
            store,
            generator,
            config,
        }
    }

    pub fn vector_store(&self) -> &S {
        &self.store
    }

    pub fn generator(&self) -> &EmbeddingGenerator {
        &self.generator
    }

    pub fn search_config(&self) -> &SearchConfig {
        &self.config
    }

    /// Embed `text` and upsert it under `(item_type, item_id)`.
    ///
    /// Returns `Ok(false)` when the store rejects the write; the failure is
    /// logged and the caller decides whether to retry. Only blank keys are
    /// reported as errors.
    pub async fn store_embedding(
        &self,
        item_type: &str,
        item_id: &str,
        text: &str,
    ) -> Result<bool, IndexError> {
        validate_key(item_type, item_id)?;

        let embedding = self.generator.embed(text).await;
        match self
            .store
            .put(item_type, item_id, &embedding.vector, text)
            .await
        {
            Ok(()) => {
                tracing::info!(
                    item_type,
                    item_id,
                    degraded = embedding.source == EmbeddingSource::Fallback,
                    "Stored embedding"
                );
                Ok(true)
            }
            Err(e) => {
                tracing::error!(item_type, item_id, error = %e, "Failed to store embedding");
                Ok(false)
            }
        }
    }

    /// Rank stored items by similarity to the query.
    ///
    /// - Text, when present, is embedded to form the query vector.
    /// - Otherwise the referenced item's stored vector is used, re-embedding
    ///   its stored text if the vector is unreadable. A missing reference
    ///   yields an empty response.
    /// - Candidates with empty text or a different dimensionality than the
    ///   query are never returned.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        let top_k = self.validate_top_k(request.top_k)?;

        let Some(query_vector) = self.resolve_query_vector(&request.query).await? else {
            tracing::debug!(
                reference = ?request.query.reference(),
                "Referenced item not found, returning no results"
            );
            return Ok(SearchResponse::empty());
        };

        let excluded = if request.exclude_self {
            request.query.reference()
        } else {
            None
        };

        let records = self.store.scan_all().await?;
        let candidates = self.score_candidates(&records, &query_vector, excluded);
        let results = rank::top_k(candidates, top_k, self.config.display_text_chars);

        tracing::debug!(
            scanned = records.len(),
            returned = results.len(),
            top_k,
            "Similarity search complete"
        );

        Ok(SearchResponse::from_results(results))
    }

    fn validate_top_k(&self, top_k: i64) -> Result<usize, SearchError> {
        let max = self.config.max_top_k.max(1);
        match usize::try_from(top_k) {
            Ok(k) if (1..=max).contains(&k) => Ok(k),
            _ => Err(SearchError::InvalidTopK {
                requested: top_k,
                max,
            }),
        }
    }

    async fn resolve_query_vector(
        &self,
        query: &SearchQuery,
    ) -> Result<Option<Vec<f32>>, SearchError> {
        if let Some(text) = query.text() {
            return Ok(Some(self.generator.embed(text).await.vector));
        }

        let Some(key) = query.reference() else {
            return Err(SearchError::NoQuery);
        };

        let stored = self.store.get_vector(&key.item_type, &key.item_id).await?;
        let stale_dimension = match stored {
            Some(vector) if vector.len() == self.generator.dimension() => return Ok(Some(vector)),
            Some(vector) => Some(vector.len()),
            None => None,
        };

        match self.store.get_text(&key.item_type, &key.item_id).await? {
            Some(text) if !text.trim().is_empty() => {
                match stale_dimension {
                    Some(stored) => tracing::warn!(
                        item = %key,
                        stored,
                        expected = self.generator.dimension(),
                        "Stored vector has stale dimension, re-embedding stored text"
                    ),
                    None => tracing::warn!(
                        item = %key,
                        "Stored vector unreadable, re-embedding stored text"
                    ),
                }
                Ok(Some(self.generator.embed(&text).await.vector))
            }
            _ => Ok(None),
        }
    }

    fn score_candidates<'a>(
        &self,
        records: &'a [EmbeddingRecord],
        query_vector: &[f32],
        excluded: Option<&ItemKey>,
    ) -> Vec<ScoredCandidate<'a>> {
        let mut mismatched = 0usize;
        let candidates: Vec<ScoredCandidate<'a>> = records
            .iter()
            .filter(|r| !r.source_text.trim().is_empty())
            .filter(|r| {
                excluded.is_none_or(|key| r.item_type != key.item_type || r.item_id != key.item_id)
            })
            .filter(|r| {
                let same_dimension = r.vector.len() == query_vector.len();
                if !same_dimension {
                    mismatched += 1;
                }
                same_dimension
            })
            .map(|record| ScoredCandidate {
                record,
                score: cosine_similarity(query_vector, &record.vector),
            })
            .collect();

        if mismatched > 0 {
            tracing::warn!(
                mismatched,
                expected = query_vector.len(),
                "Skipped stored vectors with a different dimension"
            );
        }

        candidates
    }

    /// Record counts in total and per item type.
    pub async fn stats(&self) -> Result<IndexStats, RepositoryError> {
        let total_embeddings = self.store.total_count().await?;
        let by_type = self.store.count_by_type().await?;
        Ok(IndexStats {
            total_embeddings,
            by_type,
        })
    }

    /// Fetch one stored record.
    pub async fn get_record(
        &self,
        item_type: &str,
        item_id: &str,
    ) -> Result<Option<EmbeddingRecord>, RepositoryError> {
        self.store.get_record(item_type, item_id).await
    }

    /// Administrative bulk delete.
    pub async fn purge(&self, filter: &PurgeFilter) -> Result<u64, RepositoryError> {
        let deleted = self.store.purge(filter).await?;
        tracing::info!(%filter, deleted, "Purged embeddings");
        Ok(deleted)
    }
}

pub(super) fn validate_key(item_type: &str, item_id: &str) -> Result<(), IndexError> {
    if item_type.trim().is_empty() {
        return Err(IndexError::Validation("item_type cannot be empty".to_string()));
    }
    if item_id.trim().is_empty() {
        return Err(IndexError::Validation("item_id cannot be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::test_support::InMemoryVectorStore;
    use chrono::Utc;

    const D: usize = 384;

    fn index() -> SimilarityIndex<InMemoryVectorStore> {
        SimilarityIndex::new(
            InMemoryVectorStore::new(),
            EmbeddingGenerator::hashing(D),
            SearchConfig::default(),
        )
    }

    fn by_text(text: &str, top_k: i64) -> SearchRequest {
        SearchRequest::new(SearchQuery::by_text(text), top_k)
    }

    fn by_item(item_type: &str, item_id: &str, top_k: i64) -> SearchRequest {
        SearchRequest::new(SearchQuery::by_item(ItemKey::new(item_type, item_id)), top_k)
    }

    async fn seed_hotel_scenario(index: &SimilarityIndex<InMemoryVectorStore>) {
        assert!(index.store_embedding("summary", "s1", "hotel booking confirmation").await.unwrap());
        assert!(index.store_embedding("summary", "s2", "flight boarding pass").await.unwrap());
        assert!(index.store_embedding("task", "t1", "need hotel help").await.unwrap());
    }

    #[tokio::test]
    async fn test_store_then_get_text_roundtrip() {
        let index = index();
        assert!(index.store_embedding("summary", "s1", "hotel booking").await.unwrap());
        let text = index.vector_store().get_text("summary", "s1").await.unwrap();
        assert_eq!(text.as_deref(), Some("hotel booking"));
    }

    #[tokio::test]
    async fn test_store_twice_keeps_latest_only() {
        let index = index();
        index.store_embedding("summary", "s1", "first").await.unwrap();
        index.store_embedding("summary", "s1", "second version").await.unwrap();

        assert_eq!(index.vector_store().total_count().await.unwrap(), 1);
        let record = index.get_record("summary", "s1").await.unwrap().unwrap();
        assert_eq!(record.source_text, "second version");
        assert_eq!(record.vector, index.generator().embed("second version").await.vector);
    }

    #[tokio::test]
    async fn test_store_rejects_blank_keys() {
        let index = index();
        assert!(matches!(
            index.store_embedding("", "s1", "text").await,
            Err(IndexError::Validation(_))
        ));
        assert!(matches!(
            index.store_embedding("summary", "  ", "text").await,
            Err(IndexError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_storage_failure_reports_not_stored() {
        let index = index();
        index.vector_store().set_fail_writes(true);
        let stored = index.store_embedding("summary", "s1", "text").await.unwrap();
        assert!(!stored);
    }

    #[tokio::test]
    async fn test_end_to_end_hotel_scenario() {
        let index = index();
        seed_hotel_scenario(&index).await;

        let resp = index.search(&by_text("hotel reservation", 2)).await.unwrap();
        assert_eq!(resp.total_found, 2);
        let ids: Vec<&str> = resp.results.iter().map(|r| r.item_id.as_str()).collect();
        assert!(ids.contains(&"s1"));
        assert!(ids.contains(&"t1"));
        assert!(!ids.contains(&"s2"));
        assert!(resp.results.iter().all(|r| r.score > 0.0));
    }

    #[tokio::test]
    async fn test_identical_text_ranks_first() {
        let index = index();
        seed_hotel_scenario(&index).await;

        let resp = index.search(&by_text("flight boarding pass", 3)).await.unwrap();
        assert_eq!(resp.results[0].item_id, "s2");
        assert!((resp.results[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_top_k_caps_results() {
        let index = index();
        for i in 0..100 {
            index
                .store_embedding("task", &format!("t{i}"), &format!("task number {i}"))
                .await
                .unwrap();
        }
        let resp = index.search(&by_text("task number 7", 3)).await.unwrap();
        assert_eq!(resp.results.len(), 3);
        assert!((resp.results[0].score - 1.0).abs() < 1e-6);
        assert!(resp.results.iter().any(|r| r.item_id == "t7"));
    }

    #[tokio::test]
    async fn test_top_k_clamped_to_candidates() {
        let index = index();
        seed_hotel_scenario(&index).await;
        let resp = index.search(&by_text("hotel", 10)).await.unwrap();
        assert_eq!(resp.results.len(), 3);
        assert_eq!(resp.total_found, 3);
    }

    #[tokio::test]
    async fn test_invalid_top_k_rejected() {
        let index = index();
        seed_hotel_scenario(&index).await;
        for k in [0, -1, 51] {
            let err = index.search(&by_text("hotel", k)).await.unwrap_err();
            assert!(matches!(err, SearchError::InvalidTopK { requested, .. } if requested == k));
        }
    }

    #[tokio::test]
    async fn test_search_by_reference_excludes_self() {
        let index = index();
        seed_hotel_scenario(&index).await;

        let resp = index.search(&by_item("summary", "s1", 3)).await.unwrap();
        assert_eq!(resp.results.len(), 2);
        assert!(resp.results.iter().all(|r| r.item_id != "s1"));
        assert_eq!(resp.results[0].item_id, "t1");
    }

    #[tokio::test]
    async fn test_search_by_reference_can_include_self() {
        let index = index();
        seed_hotel_scenario(&index).await;

        let request = by_item("summary", "s1", 3).with_exclude_self(false);
        let resp = index.search(&request).await.unwrap();
        assert_eq!(resp.results[0].item_id, "s1");
        assert!((resp.results[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_text_takes_precedence_but_reference_still_excluded() {
        let index = index();
        seed_hotel_scenario(&index).await;

        let query = SearchQuery::new(
            Some("hotel booking confirmation".into()),
            Some("summary".into()),
            Some("s1".into()),
        )
        .unwrap();
        let resp = index.search(&SearchRequest::new(query, 3)).await.unwrap();
        assert!(resp.results.iter().all(|r| r.item_id != "s1"));
        assert_eq!(resp.results[0].item_id, "t1");
    }

    #[tokio::test]
    async fn test_missing_reference_returns_empty() {
        let index = index();
        seed_hotel_scenario(&index).await;

        let resp = index.search(&by_item("summary", "nope", 3)).await.unwrap();
        assert!(resp.results.is_empty());
        assert_eq!(resp.total_found, 0);
    }

    #[tokio::test]
    async fn test_reference_with_unreadable_vector_reembeds_text() {
        let index = index();
        seed_hotel_scenario(&index).await;
        // A record whose vector was lost but whose text survived.
        index.vector_store().insert_raw(EmbeddingRecord {
            item_type: "summary".into(),
            item_id: "s9".into(),
            vector: vec![],
            source_text: "flight boarding pass".into(),
            created_at: Utc::now(),
        });

        assert!(index.vector_store().get_vector("summary", "s9").await.unwrap().is_none());

        let resp = index.search(&by_item("summary", "s9", 1)).await.unwrap();
        assert_eq!(resp.results[0].item_id, "s2");
        assert!((resp.results[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_reference_with_stale_dimension_reembeds_text() {
        let index = index();
        seed_hotel_scenario(&index).await;
        // Stored under a previous model with a different dimensionality.
        index.vector_store().insert_raw(EmbeddingRecord {
            item_type: "summary".into(),
            item_id: "legacy".into(),
            vector: vec![0.5; 64],
            source_text: "flight boarding pass".into(),
            created_at: Utc::now(),
        });

        let resp = index.search(&by_item("summary", "legacy", 1)).await.unwrap();
        assert_eq!(resp.total_found, 1);
        assert_eq!(resp.results[0].item_id, "s2");
        assert!((resp.results[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_text_less_records_excluded() {
        let index = index();
        seed_hotel_scenario(&index).await;
        index.vector_store().insert_raw(EmbeddingRecord {
            item_type: "summary".into(),
            item_id: "blank".into(),
            vector: index.generator().embed("hotel reservation").await.vector,
            source_text: String::new(),
            created_at: Utc::now(),
        });

        let resp = index.search(&by_text("hotel reservation", 5)).await.unwrap();
        assert!(resp.results.iter().all(|r| r.item_id != "blank"));
    }

    #[tokio::test]
    async fn test_mismatched_dimension_excluded() {
        let index = index();
        seed_hotel_scenario(&index).await;
        index.vector_store().insert_raw(EmbeddingRecord {
            item_type: "summary".into(),
            item_id: "old".into(),
            vector: vec![1.0; 64],
            source_text: "hotel reservation".into(),
            created_at: Utc::now(),
        });

        let resp = index.search(&by_text("hotel reservation", 5)).await.unwrap();
        assert!(resp.results.iter().all(|r| r.item_id != "old"));
        assert_eq!(resp.results.len(), 3);
    }

    #[tokio::test]
    async fn test_repeated_queries_are_reproducible() {
        let index = index();
        for id in ["b", "a", "c"] {
            index.store_embedding("task", id, "same text").await.unwrap();
        }
        let first = index.search(&by_text("same text", 3)).await.unwrap();
        let second = index.search(&by_text("same text", 3)).await.unwrap();
        assert_eq!(first, second);
        let ids: Vec<&str> = first.results.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_long_text_truncated_in_results() {
        let index = index();
        let long_text = format!("hotel {}", "x".repeat(500));
        index.store_embedding("summary", "long", &long_text).await.unwrap();

        let resp = index.search(&by_text(&long_text, 1)).await.unwrap();
        assert_eq!(resp.results[0].text.chars().count(), 203);
        assert!(resp.results[0].text.ends_with("..."));
        assert!((resp.results[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_storage_failure_during_search_is_error() {
        let index = index();
        seed_hotel_scenario(&index).await;
        index.vector_store().set_fail_reads(true);
        let err = index.search(&by_text("hotel", 3)).await.unwrap_err();
        assert!(matches!(err, SearchError::Storage(_)));
        assert!(!err.is_validation());
    }

    #[tokio::test]
    async fn test_stats_counts_by_type() {
        let index = index();
        seed_hotel_scenario(&index).await;
        let stats = index.stats().await.unwrap();
        assert_eq!(stats.total_embeddings, 3);
        assert_eq!(stats.by_type.get("summary"), Some(&2));
        assert_eq!(stats.by_type.get("task"), Some(&1));
    }

    #[tokio::test]
    async fn test_purge_by_type() {
        let index = index();
        seed_hotel_scenario(&index).await;
        let deleted = index
            .purge(&PurgeFilter::ItemType("summary".into()))
            .await
            .unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(index.vector_store().total_count().await.unwrap(), 1);
    }
}
