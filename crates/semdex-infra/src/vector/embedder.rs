//! FastEmbed-based local embedding generator.
//!
//! Implements the `Embedder` trait from `semdex-core` using fastembed's ONNX
//! runtime inference. The model is downloaded and loaded once, on first use,
//! by a background task that outlives timed-out callers. Inference runs on
//! the blocking thread pool.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use semdex_core::embedding::embedder::Embedder;
use semdex_core::embedding::lazy::LazyLoad;
use semdex_types::error::EmbeddingError;

use super::ModelSpec;

/// Local text-embedding model backed by fastembed.
pub struct FastEmbedEmbedder {
    spec: ModelSpec,
    cache_dir: Option<PathBuf>,
    model: LazyLoad<Mutex<TextEmbedding>>,
}

impl FastEmbedEmbedder {
    /// Create an embedder for `spec`. Nothing is loaded until the first call.
    ///
    /// `cache_dir` overrides where model files are downloaded.
    pub fn new(spec: ModelSpec, cache_dir: Option<PathBuf>) -> Self {
        Self {
            spec,
            cache_dir,
            model: LazyLoad::new(),
        }
    }

    fn fastembed_model(&self) -> Result<EmbeddingModel, EmbeddingError> {
        match self.spec.name {
            "all-minilm-l6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
            "all-minilm-l12-v2" => Ok(EmbeddingModel::AllMiniLML12V2),
            "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
            "bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
            other => Err(EmbeddingError::Unavailable(format!(
                "model '{other}' is not supported by fastembed"
            ))),
        }
    }

    async fn loaded(&self) -> Result<Arc<Mutex<TextEmbedding>>, EmbeddingError> {
        if let Some(model) = self.model.get() {
            return Ok(model);
        }

        let mut options =
            InitOptions::new(self.fastembed_model()?).with_show_download_progress(false);
        if let Some(dir) = &self.cache_dir {
            options = options.with_cache_dir(dir.clone());
        }

        let name = self.spec.name;
        self.model
            .get_or_load(move || {
                tracing::info!(model = name, "Loading embedding model");
                TextEmbedding::try_new(options)
                    .map(Mutex::new)
                    .map_err(|e| EmbeddingError::Unavailable(e.to_string()))
            })
            .await
    }
}

impl Embedder for FastEmbedEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let model = self.loaded().await?;
        let texts = texts.to_vec();

        tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| EmbeddingError::Model("embedding model lock poisoned".to_string()))?;
            model
                .embed(texts, None)
                .map_err(|e| EmbeddingError::Model(e.to_string()))
        })
        .await
        .map_err(|e| EmbeddingError::Model(format!("embedding task panicked: {e}")))?
    }

    fn model_name(&self) -> &str {
        self.spec.name
    }

    fn dimension(&self) -> usize {
        self.spec.dimension
    }
}
