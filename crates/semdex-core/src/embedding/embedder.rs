//! Embedder trait for text-to-vector conversion.
//!
//! Defines the interface for embedding text into vectors for similarity
//! search. The hashing embedder lives alongside this trait; learned-model
//! implementations (e.g. fastembed) live in semdex-infra.

use semdex_types::error::EmbeddingError;

/// Trait for converting text into embedding vectors.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait Embedder: Send + Sync {
    /// Embed one or more texts into vectors.
    ///
    /// Returns one vector per input text, each of length [`Embedder::dimension`].
    fn embed(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, EmbeddingError>> + Send;

    /// The model name used for embeddings (e.g., "all-minilm-l6-v2").
    fn model_name(&self) -> &str;

    /// The dimensionality of the output vectors.
    fn dimension(&self) -> usize;
}
