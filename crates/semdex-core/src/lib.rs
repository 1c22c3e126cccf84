//! Embedding, ranking and storage ports for semdex.
//!
//! This crate defines the `VectorStore` port that the infrastructure layer
//! implements. It depends only on `semdex-types` -- never on
//! `semdex-infra` or any database/IO crate.

pub mod embedding;
pub mod repository;
pub mod similarity;
