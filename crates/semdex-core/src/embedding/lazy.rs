//! Load-once handle for expensive blocking resources such as model weights.
//!
//! The load runs on a spawned task that owns the shared cell, so a caller
//! that gives up waiting (a timed-out embedding attempt, a dropped request)
//! does not cancel it. Later callers join the in-flight load instead of
//! starting another one. A failed load leaves the cell empty and the next
//! caller tries again.

use std::sync::Arc;

use semdex_types::error::EmbeddingError;
use tokio::sync::OnceCell;

pub struct LazyLoad<T> {
    cell: Arc<OnceCell<Arc<T>>>,
}

impl<T> std::fmt::Debug for LazyLoad<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyLoad")
            .field("loaded", &self.cell.initialized())
            .finish()
    }
}

impl<T> Default for LazyLoad<T> {
    fn default() -> Self {
        Self {
            cell: Arc::new(OnceCell::new()),
        }
    }
}

impl<T: Send + Sync + 'static> LazyLoad<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The loaded value, if loading has completed.
    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }

    /// Return the loaded value, running `load` on the blocking pool if no
    /// load has succeeded yet.
    pub async fn get_or_load<F>(&self, load: F) -> Result<Arc<T>, EmbeddingError>
    where
        F: FnOnce() -> Result<T, EmbeddingError> + Send + 'static,
    {
        if let Some(value) = self.cell.get() {
            return Ok(value.clone());
        }

        let cell = Arc::clone(&self.cell);
        let task = tokio::spawn(async move {
            cell.get_or_try_init(|| async move {
                tokio::task::spawn_blocking(load)
                    .await
                    .map_err(|e| EmbeddingError::Model(format!("model loader panicked: {e}")))?
                    .map(Arc::new)
            })
            .await
            .cloned()
        });

        task.await
            .map_err(|e| EmbeddingError::Model(format!("model loader task failed: {e}")))?
    }
}
