//! Construction of the embedding generator and similarity index from config.

use std::path::Path;

use anyhow::Context;
use semdex_core::embedding::generator::EmbeddingGenerator;
use semdex_core::similarity::SimilarityIndex;
use semdex_types::config::{EmbeddingStrategy, GlobalConfig};

use crate::sqlite::embedding::SqliteVectorStore;
use crate::sqlite::pool::DatabasePool;

/// Directory under the data dir where learned model files are cached.
pub const MODEL_CACHE_DIR: &str = "models";

/// Build the generator selected by `config.embedding.strategy`.
///
/// A learned strategy naming an unknown model, or a build without the
/// `fastembed` feature, degrades to hashing with a warning.
pub fn build_generator(config: &GlobalConfig, data_dir: &Path) -> EmbeddingGenerator {
    let embedding = &config.embedding;
    match embedding.strategy {
        EmbeddingStrategy::Hashing => EmbeddingGenerator::hashing(embedding.dimension),
        EmbeddingStrategy::Learned => match crate::vector::find_model(&embedding.model) {
            Some(spec) => learned_generator(spec, config, data_dir),
            None => {
                tracing::warn!(
                    model = %embedding.model,
                    "Unknown embedding model, using hashing strategy"
                );
                EmbeddingGenerator::hashing(embedding.dimension)
            }
        },
    }
}

#[cfg(feature = "fastembed")]
fn learned_generator(
    spec: crate::vector::ModelSpec,
    config: &GlobalConfig,
    data_dir: &Path,
) -> EmbeddingGenerator {
    use semdex_core::embedding::box_embedder::BoxEmbedder;

    use crate::vector::embedder::FastEmbedEmbedder;

    let embedder = FastEmbedEmbedder::new(spec, Some(data_dir.join(MODEL_CACHE_DIR)));
    EmbeddingGenerator::learned_from_config(BoxEmbedder::new(embedder), &config.embedding)
}

#[cfg(not(feature = "fastembed"))]
fn learned_generator(
    spec: crate::vector::ModelSpec,
    _config: &GlobalConfig,
    _data_dir: &Path,
) -> EmbeddingGenerator {
    tracing::warn!(
        model = spec.name,
        "Built without fastembed support, using hashing strategy"
    );
    EmbeddingGenerator::hashing(spec.dimension)
}

/// Open the SQLite store under `data_dir` and assemble the similarity index.
pub async fn open_index(
    config: &GlobalConfig,
    data_dir: &Path,
) -> anyhow::Result<SimilarityIndex<SqliteVectorStore>> {
    let pool = DatabasePool::open_in(data_dir)
        .await
        .with_context(|| format!("failed to open database in {}", data_dir.display()))?;

    let generator = build_generator(config, data_dir);
    tracing::info!(
        model = generator.model_name(),
        dimension = generator.dimension(),
        "Embedding generator ready"
    );

    Ok(SimilarityIndex::new(
        SqliteVectorStore::new(pool),
        generator,
        config.search.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use semdex_types::embedding::IndexItem;
    use semdex_types::embedding::IndexOptions;
    use semdex_types::search::{SearchQuery, SearchRequest};

    fn hashing_config(dimension: usize) -> GlobalConfig {
        let mut config = GlobalConfig::default();
        config.embedding.strategy = EmbeddingStrategy::Hashing;
        config.embedding.dimension = dimension;
        config
    }

    #[test]
    fn test_hashing_strategy() {
        let generator = build_generator(&hashing_config(128), Path::new("."));
        assert!(!generator.is_learned());
        assert_eq!(generator.dimension(), 128);
    }

    #[test]
    fn test_unknown_model_falls_back_to_hashing() {
        let mut config = GlobalConfig::default();
        config.embedding.model = "no-such-model".to_string();
        config.embedding.dimension = 64;
        let generator = build_generator(&config, Path::new("."));
        assert!(!generator.is_learned());
        assert_eq!(generator.dimension(), 64);
    }

    #[cfg(feature = "fastembed")]
    #[test]
    fn test_learned_strategy_uses_model_dimension() {
        let mut config = GlobalConfig::default();
        config.embedding.model = "bge-base-en-v1.5".to_string();
        let generator = build_generator(&config, Path::new("."));
        assert!(generator.is_learned());
        assert_eq!(generator.dimension(), 768);
        assert_eq!(generator.model_name(), "bge-base-en-v1.5");
    }

    #[tokio::test]
    async fn test_open_index_end_to_end() {
        let tmp = tempfile::tempdir().unwrap();
        let index = open_index(&hashing_config(384), tmp.path()).await.unwrap();

        let items = vec![
            IndexItem {
                id: "s1".into(),
                text: "hotel booking confirmation".into(),
            },
            IndexItem {
                id: "s2".into(),
                text: "flight boarding pass".into(),
            },
        ];
        let report = index
            .index_items("summary", &items, IndexOptions::default())
            .await
            .unwrap();
        assert_eq!(report.indexed, 2);
        assert!(index.store_embedding("task", "t1", "need hotel help").await.unwrap());

        let request = SearchRequest::new(SearchQuery::by_text("hotel reservation"), 2);
        let resp = index.search(&request).await.unwrap();
        let ids: Vec<&str> = resp.results.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"s1"));
        assert!(ids.contains(&"t1"));
    }

    #[tokio::test]
    async fn test_index_persists_across_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let config = hashing_config(64);
        {
            let index = open_index(&config, tmp.path()).await.unwrap();
            index.store_embedding("task", "t1", "persist me").await.unwrap();
        }
        let index = open_index(&config, tmp.path()).await.unwrap();
        let record = index.get_record("task", "t1").await.unwrap().unwrap();
        assert_eq!(record.source_text, "persist me");
        assert_eq!(record.dimension(), 64);
    }
}
