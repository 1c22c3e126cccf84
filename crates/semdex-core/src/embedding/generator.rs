//! Embedding generator with strategy selection and graceful degradation.
//!
//! A deployment runs either the hashing strategy alone or a learned model
//! backed by the hashing strategy. Calls into the learned model are bounded
//! by a per-attempt timeout and retried with exponential backoff; once the
//! attempts are exhausted the hashing vector is returned instead. Embedding
//! therefore never fails from the caller's point of view -- degraded
//! similarity is preferred over an outage.

use std::time::Duration;

use semdex_types::config::EmbeddingConfig;
use semdex_types::embedding::{Embedding, EmbeddingSource};
use semdex_types::error::EmbeddingError;

use super::box_embedder::BoxEmbedder;
use super::embedder::Embedder;
use super::hashing::HashingEmbedder;
use super::retry::RetryPolicy;

/// Text-to-vector service used by the similarity index.
#[derive(Debug)]
pub struct EmbeddingGenerator {
    /// Learned model, if this deployment uses one.
    primary: Option<BoxEmbedder>,
    /// Deterministic strategy; also the fallback for `primary`.
    hashing: HashingEmbedder,
    retry: RetryPolicy,
    timeout: Duration,
}

impl EmbeddingGenerator {
    /// Hashing-only generator producing `dimension`-length vectors.
    pub fn hashing(dimension: usize) -> Self {
        Self {
            primary: None,
            hashing: HashingEmbedder::new(dimension),
            retry: RetryPolicy::none(),
            timeout: Duration::ZERO,
        }
    }

    /// Generator backed by a learned model.
    ///
    /// The hashing fallback adopts the model's dimensionality so fallback
    /// vectors stay comparable with model vectors.
    pub fn learned(embedder: BoxEmbedder, retry: RetryPolicy, timeout: Duration) -> Self {
        let dimension = embedder.dimension();
        Self {
            primary: Some(embedder),
            hashing: HashingEmbedder::new(dimension),
            retry,
            timeout,
        }
    }

    /// Learned generator with retry and timeout taken from configuration.
    pub fn learned_from_config(embedder: BoxEmbedder, config: &EmbeddingConfig) -> Self {
        Self::learned(
            embedder,
            RetryPolicy::from_config(config),
            Duration::from_millis(config.timeout_ms),
        )
    }

    /// Length of every vector this generator returns.
    pub fn dimension(&self) -> usize {
        self.hashing.dimension()
    }

    /// Name of the strategy answering in the normal case.
    pub fn model_name(&self) -> &str {
        match &self.primary {
            Some(embedder) => embedder.model_name(),
            None => HashingEmbedder::MODEL_NAME,
        }
    }

    pub fn is_learned(&self) -> bool {
        self.primary.is_some()
    }

    /// Embed `text`. Never fails.
    ///
    /// Blank text maps to the all-zero vector without consulting any model.
    pub async fn embed(&self, text: &str) -> Embedding {
        let Some(primary) = &self.primary else {
            return Embedding {
                vector: self.hashing.embed_text(text),
                source: EmbeddingSource::Primary,
            };
        };

        if text.trim().is_empty() {
            return Embedding {
                vector: vec![0.0; self.dimension()],
                source: EmbeddingSource::Primary,
            };
        }

        match self.embed_with_retry(primary, text).await {
            Ok(vector) => Embedding {
                vector,
                source: EmbeddingSource::Primary,
            },
            Err(e) => {
                tracing::warn!(
                    model = primary.model_name(),
                    error = %e,
                    "Embedding model failed, using hashing fallback"
                );
                Embedding {
                    vector: self.hashing.embed_text(text),
                    source: EmbeddingSource::Fallback,
                }
            }
        }
    }

    async fn embed_with_retry(
        &self,
        primary: &BoxEmbedder,
        text: &str,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let mut attempt = 1;
        loop {
            match self.embed_once(primary, text).await {
                Ok(vector) => return Ok(vector),
                Err(e) if self.retry.should_retry(attempt) => {
                    let delay = self.retry.backoff(attempt);
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Embedding attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn embed_once(
        &self,
        primary: &BoxEmbedder,
        text: &str,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let texts = [text.to_string()];
        let vectors = tokio::time::timeout(self.timeout, primary.embed(&texts))
            .await
            .map_err(|_| EmbeddingError::Timeout(self.timeout.as_millis() as u64))??;

        let vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Model("model returned no vectors".to_string()))?;

        if vector.len() != self.dimension() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension(),
                actual: vector.len(),
            });
        }

        Ok(vector)
    }
}
