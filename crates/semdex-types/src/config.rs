//! Global configuration types for semdex.
//!
//! `GlobalConfig` represents the top-level `config.toml` that selects the
//! embedding strategy and bounds search requests.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Top-level configuration.
///
/// Loaded from `~/.semdex/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

/// Which embedding strategy a deployment runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingStrategy {
    /// External text-embedding model with hashing fallback.
    Learned,
    /// Token hashing only; no external dependency.
    Hashing,
}

impl fmt::Display for EmbeddingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingStrategy::Learned => write!(f, "learned"),
            EmbeddingStrategy::Hashing => write!(f, "hashing"),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_strategy")]
    pub strategy: EmbeddingStrategy,

    /// Learned model name (fastembed catalogue, e.g. "all-minilm-l6-v2").
    #[serde(default = "default_model")]
    pub model: String,

    /// Vector dimensionality for the hashing strategy. The learned strategy
    /// uses its model's own dimensionality.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Bound on a single external model call.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Attempts at the external model before falling back.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay for exponential backoff between attempts.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

fn default_strategy() -> EmbeddingStrategy {
    EmbeddingStrategy::Learned
}

fn default_model() -> String {
    "all-minilm-l6-v2".to_string()
}

fn default_dimension() -> usize {
    384
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            model: default_model(),
            dimension: default_dimension(),
            timeout_ms: default_timeout_ms(),
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

/// Search request bounds and display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_top_k")]
    pub default_top_k: i64,

    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,

    /// Characters of source text kept in results before the `...` marker.
    #[serde(default = "default_display_text_chars")]
    pub display_text_chars: usize,
}

fn default_top_k() -> i64 {
    3
}

fn default_max_top_k() -> usize {
    50
}

fn default_display_text_chars() -> usize {
    200
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
            max_top_k: default_max_top_k(),
            display_text_chars: default_display_text_chars(),
        }
    }
}
