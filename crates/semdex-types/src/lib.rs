//! Shared domain types for semdex.
//!
//! This crate contains the core domain types used across the workspace:
//! embedding records, search queries and results, configuration, and
//! their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod embedding;
pub mod error;
pub mod search;
