//! Repository pattern implementation for the in-memory catalog
//!
//! The store owns the cartoon sequence. Readers get cloned snapshots, and the
//! only mutation (delete) happens under the write lock.

use crate::core::config::DataConfig;
use crate::core::error::{CatalogError, Result};
use crate::store::dataset;
use crate::store::models::Cartoon;
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

/// Generic repository trait for the operations the API needs
#[async_trait]
pub trait Repository<T>: Send + Sync {
    /// Snapshot of all entities in store order
    async fn find_all(&self) -> Result<Vec<T>>;

    /// Find an entity by its textual ID
    async fn find_by_id(&self, id: &str) -> Result<Option<T>>;

    /// Delete an entity by its textual ID, returning the removed entity
    async fn delete(&self, id: &str) -> Result<Option<T>>;
}

/// In-memory store of cartoons, kept in insertion order
pub struct CartoonStore {
    cartoons: RwLock<Vec<Cartoon>>,
}

impl CartoonStore {
    /// Create a store from an ordered sequence of cartoons
    ///
    /// Fails when two cartoons share an id.
    pub fn new(cartoons: Vec<Cartoon>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(cartoons.len());
        for cartoon in &cartoons {
            if !seen.insert(cartoon.id) {
                return Err(CatalogError::InvalidDataset(format!(
                    "duplicate cartoon id {}",
                    cartoon.id
                )));
            }
        }

        Ok(Self {
            cartoons: RwLock::new(cartoons),
        })
    }

    /// Build the store from the configured dataset, or the bundled one
    pub fn load(config: &DataConfig) -> Result<Self> {
        let cartoons = match &config.dataset_path {
            Some(path) => dataset::load_from_file(path)?,
            None => dataset::load_embedded()?,
        };

        tracing::info!(
            count = cartoons.len(),
            source = ?config.dataset_path,
            "Catalog dataset loaded"
        );

        Self::new(cartoons)
    }

    /// Number of cartoons currently in the store
    pub async fn len(&self) -> usize {
        self.cartoons.read().await.len()
    }

    /// Whether the store has no cartoons left
    pub async fn is_empty(&self) -> bool {
        self.cartoons.read().await.is_empty()
    }
}

#[async_trait]
impl Repository<Cartoon> for CartoonStore {
    async fn find_all(&self) -> Result<Vec<Cartoon>> {
        Ok(self.cartoons.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Cartoon>> {
        let cartoons = self.cartoons.read().await;
        Ok(cartoons.iter().find(|c| c.matches_id(id)).cloned())
    }

    async fn delete(&self, id: &str) -> Result<Option<Cartoon>> {
        let mut cartoons = self.cartoons.write().await;
        let removed = cartoons
            .iter()
            .position(|c| c.matches_id(id))
            .map(|idx| cartoons.remove(idx));

        if let Some(cartoon) = &removed {
            tracing::info!(id = cartoon.id, remaining = cartoons.len(), "Cartoon removed");
        }

        Ok(removed)
    }
}
