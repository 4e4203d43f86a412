//! Schema synchronizer
//!
//! Reconciles a kind's declared structure with the live table at startup:
//! creates the table when it is missing, adds and retypes columns when the
//! declaration drifted ahead. Removal is computed for logging but never acted
//! on.

use std::collections::HashMap;
use std::sync::Arc;

use cache_system::{CacheParams, CacheStore, CacheStoreExt, KeyBuilder};
use structure_registry::{diff_structures, table_name, DeclaredStructure, Dialect, StructureDiff};
use tracing::{debug, error, info, warn};

use crate::engine::{EngineError, StorageEngine};
use crate::errors::StoreError;
use crate::sql;
use crate::value::SqlValue;

/// Read the live column name/type pairs for a table. Names are lowercased so
/// they compare cleanly against declared structures.
pub(crate) async fn introspect_columns(
    engine: &dyn StorageEngine,
    table: &str,
) -> Result<HashMap<String, String>, EngineError> {
    let dialect = engine.dialect();
    let (query, params) = sql::live_structure(dialect, table);
    let rows = engine.query(&query, params).await?;
    let (name_field, type_field) = sql::column_fields(dialect);

    let mut columns = HashMap::new();
    for row in rows {
        let name = match row.get(name_field) {
            Some(SqlValue::Text(s)) => s.to_lowercase(),
            _ => continue,
        };
        let declared_type = match row.get(type_field) {
            Some(SqlValue::Text(s)) => s.clone(),
            _ => String::new(),
        };
        columns.insert(name, declared_type);
    }
    Ok(columns)
}

/// Startup reconciliation for one kind's table
pub struct SchemaSync {
    engine: Arc<dyn StorageEngine>,
    cache: Arc<dyn CacheStore>,
    keys: KeyBuilder,
    kind: String,
    table: String,
    structure: DeclaredStructure,
}

impl SchemaSync {
    pub fn new(
        engine: Arc<dyn StorageEngine>,
        cache_params: &CacheParams,
        table_prefix: &str,
        kind: &str,
        structure: DeclaredStructure,
    ) -> Self {
        let table = table_name(table_prefix, kind);
        Self {
            engine,
            cache: cache_params.store.clone(),
            keys: cache_params.keys(),
            kind: kind.to_string(),
            table,
            structure,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn dialect(&self) -> Dialect {
        self.engine.dialect()
    }

    /// Whether the table exists, read through the cache
    pub async fn table_exists(&self) -> Result<bool, StoreError> {
        let key = self.keys.key("exists", &self.kind, &[]);
        if let Some(cached) = self.cache.get_json::<bool>(&key).await? {
            return Ok(cached);
        }
        let (query, params) = sql::table_exists(self.dialect(), &self.table);
        let exists = !self.engine.query(&query, params).await?.is_empty();
        self.cache.set_json(&key, &exists).await?;
        Ok(exists)
    }

    /// The live column layout, read through the cache
    pub async fn live_structure(&self) -> Result<HashMap<String, String>, StoreError> {
        let key = self.keys.key("column_names", &self.kind, &[]);
        if let Some(cached) = self.cache.get_json::<HashMap<String, String>>(&key).await? {
            return Ok(cached);
        }
        let live = introspect_columns(self.engine.as_ref(), &self.table).await?;
        self.cache.set_json(&key, &live).await?;
        Ok(live)
    }

    /// Classify the drift between the declared and live structures
    pub async fn diff(&self) -> Result<StructureDiff, StoreError> {
        let live = self.live_structure().await?;
        Ok(diff_structures(&self.structure, &live, self.dialect()))
    }

    /// Create the table from the declared structure. Returns whether the
    /// table can be assumed to exist afterwards.
    pub async fn create_table(&self) -> bool {
        if self.structure.is_empty() {
            warn!(kind = %self.kind, "refusing to create table with no declared columns");
            return false;
        }
        let statement = sql::create_table(self.dialect(), &self.table, &self.structure);
        debug!(table = %self.table, %statement, "creating table");
        if let Err(err) = self.engine.execute(&statement, vec![]).await {
            error!(table = %self.table, error = %err, "table creation failed");
            return false;
        }
        self.invalidate_structure().await;
        info!(table = %self.table, "created table");
        true
    }

    /// Apply the `add`/`modify` entries of a diff. Returns whether every
    /// actionable entry was applied.
    pub async fn apply_diff(&self, diff: &StructureDiff) -> bool {
        if !diff.has_changes() {
            return true;
        }
        if self.dialect() == Dialect::Sqlite && !diff.modify.is_empty() {
            for (name, _) in &diff.modify {
                warn!(table = %self.table, column = %name, "sqlite cannot retype a column; skipping");
            }
        }
        for (name, _) in &diff.remove {
            info!(table = %self.table, column = %name, "live column no longer declared; leaving in place");
        }
        let statements = sql::alter_table(self.dialect(), &self.table, diff);
        for statement in statements {
            debug!(table = %self.table, %statement, "altering table");
            if let Err(err) = self.engine.execute(&statement, vec![]).await {
                error!(table = %self.table, error = %err, "table alteration failed");
                return false;
            }
        }
        self.invalidate_structure().await;
        true
    }

    /// Bring the table in line with the declared structure.
    ///
    /// The existence check goes straight to the engine rather than through
    /// the cache, so a table dropped behind a warm cache is still recreated.
    /// Returns `Ok(true)` when the table matches the declaration afterwards
    /// and `Ok(false)` when a create/alter step failed; errors are reserved
    /// for introspection and cache failures.
    pub async fn ensure_synchronized(&self) -> Result<bool, StoreError> {
        let (query, params) = sql::table_exists(self.dialect(), &self.table);
        if self.engine.query(&query, params).await?.is_empty() {
            return Ok(self.create_table().await);
        }
        let diff = self.diff().await?;
        if !diff.has_changes() {
            debug!(table = %self.table, "structure already in sync");
            return Ok(true);
        }
        info!(
            table = %self.table,
            add = diff.add.len(),
            modify = diff.modify.len(),
            "synchronizing structure"
        );
        Ok(self.apply_diff(&diff).await)
    }

    async fn invalidate_structure(&self) {
        for scope in self.keys.structure_scopes(&self.kind) {
            if let Err(err) = self.cache.delete_prefix(&scope).await {
                warn!(%scope, error = %err, "structure cache invalidation failed");
            }
        }
    }
}
