use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    services::{catalog::Catalog, sources::CatalogSource},
};

/// Read-through cache for the loaded catalog
///
/// The first `get` loads from the source; later calls share the same
/// `Arc<Catalog>` until `invalidate` drops it. The catalog itself is never
/// mutated, so readers only hold the lock long enough to clone the `Arc`.
#[derive(Clone)]
pub struct CatalogStore {
    source: Arc<dyn CatalogSource>,
    cached: Arc<RwLock<Option<Arc<Catalog>>>>,
}

impl CatalogStore {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the cached catalog, loading it on first use
    pub async fn get(&self) -> AppResult<Arc<Catalog>> {
        if let Some(catalog) = self.cached.read().await.as_ref() {
            tracing::debug!("Catalog cache hit");
            return Ok(Arc::clone(catalog));
        }

        let mut slot = self.cached.write().await;
        // Another caller may have loaded it while we waited for the write lock.
        if let Some(catalog) = slot.as_ref() {
            return Ok(Arc::clone(catalog));
        }

        tracing::debug!(source = self.source.name(), "Catalog cache miss");

        let source = Arc::clone(&self.source);
        let catalog = tokio::task::spawn_blocking(move || Catalog::load(source.as_ref()))
            .await
            .map_err(|e| AppError::Internal(format!("catalog load task failed: {}", e)))??;

        let catalog = Arc::new(catalog);
        *slot = Some(Arc::clone(&catalog));
        Ok(catalog)
    }

    /// Drops the cached catalog so the next `get` reloads it
    pub async fn invalidate(&self) {
        let previous = self.cached.write().await.take();
        tracing::info!(was_loaded = previous.is_some(), "Catalog cache invalidated");
    }

    /// Forces a reload and returns the fresh catalog
    pub async fn reload(&self) -> AppResult<Arc<Catalog>> {
        self.invalidate().await;
        self.get().await
    }
}
