//! Similarity search over stored embeddings.
//!
//! Exact (brute-force) cosine ranking: every stored vector is scored on each
//! query. `SimilarityIndex` ties the embedding generator, the vector store
//! and the ranking rules together.

mod bulk;
pub mod cosine;
pub mod index;
pub mod rank;

#[cfg(test)]
pub(crate) mod test_support;

pub use index::SimilarityIndex;
