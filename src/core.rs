//! Core ShadowStore functionality
//!
//! The coordinator owns the storage engine handle, the cache wiring, and the
//! structure registry, and hands out per-kind record stores and object
//! mappers.

use std::sync::Arc;

use cache_system::CacheParams;
use config::{AppConfig, StoreConfig};
use record_store::{Entity, ObjectMapper, RecordStore, SqliteEngine, StorageEngine};
use structure_registry::{DeclaredStructure, StructureRegistry};
use tracing::{debug, warn};

use crate::errors::ShadowStoreError;
use crate::{debug_log, trace_log};

/// Coordinator for one storage engine and its declared kinds
pub struct ShadowStore {
    engine: Arc<dyn StorageEngine>,
    cache: CacheParams,
    registry: StructureRegistry,
    table_prefix: String,
    scan_warn_threshold: usize,
}

impl ShadowStore {
    /// Wire a coordinator from its parts
    pub fn new(engine: Arc<dyn StorageEngine>, cache: CacheParams, store: &StoreConfig) -> Self {
        Self {
            engine,
            cache,
            registry: StructureRegistry::new(),
            table_prefix: store.table_prefix.clone(),
            scan_warn_threshold: store.scan_warn_threshold,
        }
    }

    /// Build the bundled SQLite engine and cache backend from configuration
    pub async fn from_config(config: &AppConfig) -> Result<Self, ShadowStoreError> {
        let engine = SqliteEngine::from_config(&config.engine).await?;
        let cache = CacheParams::from_settings(&config.cache)?;
        Ok(Self::new(Arc::new(engine), cache, &config.store))
    }

    pub fn engine(&self) -> Arc<dyn StorageEngine> {
        self.engine.clone()
    }

    pub fn cache(&self) -> &CacheParams {
        &self.cache
    }

    pub fn registry(&self) -> &StructureRegistry {
        &self.registry
    }

    pub fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    /// Register a kind's declared structure and synchronize its table.
    ///
    /// Returns whether the table matches the declaration afterwards; a failed
    /// create/alter step reports `false` rather than an error so startup can
    /// proceed with the remaining kinds.
    pub async fn declare_structure(
        &mut self,
        kind: &str,
        structure: DeclaredStructure,
    ) -> Result<bool, ShadowStoreError> {
        self.registry.declare(kind, structure)?;
        debug_log!(kind = %kind, "declared structure");
        self.synchronize(kind).await
    }

    /// Row-level access to a kind's table.
    ///
    /// Construction performs the existence-and-structure check: a declared
    /// kind is synchronized first, so a table missing from the engine is
    /// recreated here. A kind with no declared structure skips
    /// synchronization and gets a default-shaped store (id column `id`,
    /// kind-named blob) over whatever table happens to exist; nothing is
    /// guaranteed about its shape. A failed create/alter is logged and the
    /// store is handed out anyway.
    pub async fn record_store(&self, kind: &str) -> Result<RecordStore, ShadowStoreError> {
        trace_log!(kind = %kind, "building record store");
        let structure = match self.registry.get_structure(kind) {
            Some(structure) => structure.clone(),
            None => {
                debug!(kind = %kind, "no declared structure; skipping synchronization");
                DeclaredStructure::new()
            }
        };
        if !structure.is_empty() && !self.synchronize(kind).await? {
            warn!(kind = %kind, "synchronization failed; table may be stale");
        }
        Ok(RecordStore::new(
            self.engine.clone(),
            &self.cache,
            &self.table_prefix,
            kind,
            &structure,
        ))
    }

    /// Typed access to a kind. Runs the same construction-time
    /// synchronization as [`ShadowStore::record_store`].
    pub async fn mapper<T: Entity>(&self) -> Result<ObjectMapper<T>, ShadowStoreError> {
        let store = self.record_store(T::kind()).await?;
        Ok(ObjectMapper::new(store, self.scan_warn_threshold))
    }

    /// Drop a kind's table and forget its declaration
    pub async fn drop_kind(&mut self, kind: &str) -> Result<bool, ShadowStoreError> {
        let store = self.record_store(kind).await?;
        let dropped = store.drop_table().await;
        if dropped {
            self.registry.remove(kind);
        }
        Ok(dropped)
    }

    /// Check storage engine health
    pub async fn health_check(&self) -> Result<(), ShadowStoreError> {
        self.engine.query("SELECT 1", vec![]).await?;
        Ok(())
    }
}
