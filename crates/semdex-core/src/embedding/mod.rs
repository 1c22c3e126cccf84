//! Text embedding for semdex.
//!
//! `Embedder` is the port for any text-to-vector model. `HashingEmbedder` is
//! the dependency-free strategy; `EmbeddingGenerator` wraps a learned model
//! with a timeout, bounded retries and a hashing fallback so that embedding
//! never fails from the caller's point of view.

pub mod box_embedder;
pub mod embedder;
pub mod generator;
pub mod hashing;
pub mod lazy;
pub mod retry;
