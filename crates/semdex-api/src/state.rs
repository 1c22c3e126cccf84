//! Application state shared by CLI commands and REST handlers.
//!
//! The similarity index is generic over its vector store; AppState pins it
//! to the SQLite implementation.

use std::path::PathBuf;
use std::sync::Arc;

use semdex_core::similarity::SimilarityIndex;
use semdex_infra::config::load_global_config;
use semdex_infra::generator::open_index;
use semdex_infra::sqlite::embedding::SqliteVectorStore;
use semdex_types::config::GlobalConfig;

/// Concrete index type pinned to infra implementations.
pub type ConcreteIndex = SimilarityIndex<SqliteVectorStore>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<ConcreteIndex>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load `config.toml` from `data_dir`, open the database and build the
    /// configured embedding generator.
    pub async fn init(data_dir: PathBuf) -> anyhow::Result<Self> {
        let config = load_global_config(&data_dir).await;
        Self::with_config(config, data_dir).await
    }

    /// Build state from an already-loaded configuration.
    pub async fn with_config(config: GlobalConfig, data_dir: PathBuf) -> anyhow::Result<Self> {
        let index = open_index(&config, &data_dir).await?;
        Ok(Self {
            index: Arc::new(index),
            config: Arc::new(config),
            data_dir,
        })
    }
}
