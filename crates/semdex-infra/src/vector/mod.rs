//! Learned embedding models.
//!
//! Provides fastembed-based local embedding generation behind the
//! `fastembed` cargo feature.

#[cfg(feature = "fastembed")]
pub mod embedder;

/// A learned model known to this build: catalogue name and dimensionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: &'static str,
    pub dimension: usize,
}

/// Models selectable through `embedding.model` in `config.toml`.
pub const KNOWN_MODELS: &[ModelSpec] = &[
    ModelSpec {
        name: "all-minilm-l6-v2",
        dimension: 384,
    },
    ModelSpec {
        name: "all-minilm-l12-v2",
        dimension: 384,
    },
    ModelSpec {
        name: "bge-small-en-v1.5",
        dimension: 384,
    },
    ModelSpec {
        name: "bge-base-en-v1.5",
        dimension: 768,
    },
];

/// Look up a model by its catalogue name (case-insensitive).
pub fn find_model(name: &str) -> Option<ModelSpec> {
    KNOWN_MODELS
        .iter()
        .find(|m| m.name.eq_ignore_ascii_case(name.trim()))
        .copied()
}
