//! Startup synchronization
//!
//! Reconciliation of declared structures with live tables, driven from the
//! coordinator. Each kind gets its own [`SchemaSync`]; synchronizing all
//! kinds reports the worst outcome rather than stopping at the first
//! failure.

use record_store::SchemaSync;
use structure_registry::StructureDiff;
use tracing::info;

use crate::core::ShadowStore;
use crate::errors::ShadowStoreError;

impl ShadowStore {
    fn schema_sync(&self, kind: &str) -> Result<SchemaSync, ShadowStoreError> {
        let structure = self
            .registry()
            .get_structure(kind)
            .ok_or_else(|| ShadowStoreError::KindNotDeclared(kind.to_string()))?;
        Ok(SchemaSync::new(
            self.engine(),
            self.cache(),
            self.table_prefix(),
            kind,
            structure.clone(),
        ))
    }

    /// Bring one kind's table in line with its declared structure
    pub async fn synchronize(&self, kind: &str) -> Result<bool, ShadowStoreError> {
        Ok(self.schema_sync(kind)?.ensure_synchronized().await?)
    }

    /// Synchronize every declared kind; `Ok(false)` when any kind's
    /// create/alter step failed
    pub async fn synchronize_all(&self) -> Result<bool, ShadowStoreError> {
        let kinds: Vec<String> = self.registry().kinds().map(str::to_string).collect();
        let mut all_in_sync = true;
        for kind in kinds {
            let in_sync = self.synchronize(&kind).await?;
            info!(%kind, in_sync, "synchronized kind");
            all_in_sync &= in_sync;
        }
        Ok(all_in_sync)
    }

    /// The drift between a kind's declared and live structures
    pub async fn structure_diff(&self, kind: &str) -> Result<StructureDiff, ShadowStoreError> {
        Ok(self.schema_sync(kind)?.diff().await?)
    }
}
