//! Row-level store
//!
//! CRUD for one kind's table, with a read-through cache in front of every
//! read and prefix invalidation after every mutation. Reads cache their
//! result as JSON, `null` included, so "looked and found nothing" does not
//! hit the engine again until the next mutation.

use std::collections::HashMap;
use std::sync::Arc;

use cache_system::{CacheParams, CacheStore, CacheStoreExt, KeyBuilder};
use structure_registry::{sanitize_identifier, table_name, DeclaredStructure};
use tracing::{debug, error, warn};

use crate::engine::StorageEngine;
use crate::errors::StoreError;
use crate::record::Record;
use crate::schema::introspect_columns;
use crate::sql;
use crate::value::SqlValue;

pub use crate::sql::SortOrder;

/// CRUD access to one kind's table
pub struct RecordStore {
    engine: Arc<dyn StorageEngine>,
    cache: Arc<dyn CacheStore>,
    keys: KeyBuilder,
    kind: String,
    table: String,
    id_column: String,
    blob_column: String,
    created_column: Option<String>,
}

impl RecordStore {
    pub fn new(
        engine: Arc<dyn StorageEngine>,
        cache_params: &CacheParams,
        table_prefix: &str,
        kind: &str,
        structure: &DeclaredStructure,
    ) -> Self {
        Self {
            engine,
            cache: cache_params.store.clone(),
            keys: cache_params.keys(),
            kind: kind.to_string(),
            table: table_name(table_prefix, kind),
            id_column: structure
                .identity_column()
                .unwrap_or("id")
                .to_string(),
            blob_column: sanitize_identifier(kind).to_lowercase(),
            created_column: structure.timestamp_column().map(|c| c.to_string()),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn blob_column(&self) -> &str {
        &self.blob_column
    }

    pub fn created_column(&self) -> Option<&str> {
        self.created_column.as_deref()
    }

    /// Insert a row; `None` inserts a row carrying only identity and column
    /// defaults. Returns the generated identity as a string.
    pub async fn insert(
        &self,
        data: Option<HashMap<String, SqlValue>>,
    ) -> Result<String, StoreError> {
        let data = data.unwrap_or_default();
        // Sorted so the statement text is deterministic for a given column set
        let mut columns: Vec<String> = data.keys().cloned().collect();
        columns.sort();
        let params: Vec<SqlValue> = columns.iter().map(|c| data[c].clone()).collect();

        let statement = sql::insert(self.engine.dialect(), &self.table, &columns);
        let id = self.engine.insert(&statement, params).await?;
        self.invalidate_rows().await;
        debug!(table = %self.table, id, "inserted row");
        Ok(id.to_string())
    }

    /// Update the given columns of one row; returns whether a row matched
    pub async fn update(
        &self,
        id: &str,
        data: HashMap<String, SqlValue>,
    ) -> Result<bool, StoreError> {
        if data.is_empty() {
            return Ok(false);
        }
        let mut columns: Vec<String> = data.keys().cloned().collect();
        columns.sort();
        let mut params: Vec<SqlValue> = columns.iter().map(|c| data[c].clone()).collect();
        params.push(self.id_param(id));

        let statement = sql::update(&self.table, &columns, &self.id_column);
        let affected = self.engine.execute(&statement, params).await?;
        self.invalidate_rows().await;
        Ok(affected > 0)
    }

    /// Delete one row; returns whether a row matched
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let statement = sql::delete(&self.table, &self.id_column);
        let affected = self
            .engine
            .execute(&statement, vec![self.id_param(id)])
            .await?;
        self.invalidate_rows().await;
        Ok(affected > 0)
    }

    /// Drop the backing table and clear both cache partitions
    pub async fn drop_table(&self) -> bool {
        let statement = sql::drop_table(&self.table);
        if let Err(err) = self.engine.execute(&statement, vec![]).await {
            error!(table = %self.table, error = %err, "drop table failed");
            return false;
        }
        self.invalidate_rows().await;
        for scope in self.keys.structure_scopes(&self.kind) {
            if let Err(err) = self.cache.delete_prefix(&scope).await {
                warn!(%scope, error = %err, "structure cache invalidation failed");
            }
        }
        true
    }

    /// Fetch one row by identity, read through the cache
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Record>, StoreError> {
        let key = self.keys.key("all_records", &self.kind, &[&self.id_column, id]);
        if let Some(cached) = self.cache.get_json::<Option<Record>>(&key).await? {
            return Ok(cached);
        }
        let statement = sql::select_by_id(&self.table, &self.id_column);
        let rows = self.engine.query(&statement, vec![self.id_param(id)]).await?;
        let found = rows.first().map(Record::from_row);
        self.cache.set_json(&key, &found).await?;
        Ok(found)
    }

    /// Fetch the newest row matching a column value. `None` covers both "no
    /// match" and "no such column"; the latter is logged.
    pub async fn get_by_column(
        &self,
        column: &str,
        value: SqlValue,
    ) -> Result<Option<Record>, StoreError> {
        let column = sanitize_identifier(column).to_lowercase();
        if !self.column_exists(&column).await? {
            warn!(table = %self.table, %column, "lookup against missing column");
            return Ok(None);
        }
        let token = value_token(&value);
        let key = self
            .keys
            .key("all_records", &self.kind, &[&column, &token, "one"]);
        if let Some(cached) = self.cache.get_json::<Option<Record>>(&key).await? {
            return Ok(cached);
        }
        let statement =
            sql::select_by_column(&self.table, &column, self.created_column.as_deref(), true);
        let rows = self.engine.query(&statement, vec![value]).await?;
        let found = rows.first().map(Record::from_row);
        self.cache.set_json(&key, &found).await?;
        Ok(found)
    }

    /// Fetch every row matching a column value, newest first. `None` means
    /// the column does not exist, `Some(vec![])` that nothing matched.
    pub async fn get_all_by_column(
        &self,
        column: &str,
        value: SqlValue,
    ) -> Result<Option<Vec<Record>>, StoreError> {
        let column = sanitize_identifier(column).to_lowercase();
        if !self.column_exists(&column).await? {
            return Ok(None);
        }
        let token = value_token(&value);
        let key = self
            .keys
            .key("all_records", &self.kind, &[&column, &token, "all"]);
        if let Some(cached) = self.cache.get_json::<Vec<Record>>(&key).await? {
            return Ok(Some(cached));
        }
        let statement =
            sql::select_by_column(&self.table, &column, self.created_column.as_deref(), false);
        let rows = self.engine.query(&statement, vec![value]).await?;
        let records: Vec<Record> = rows.iter().map(Record::from_row).collect();
        self.cache.set_json(&key, &records).await?;
        Ok(Some(records))
    }

    /// Identity values of every row matching a column value. `None` means
    /// the column does not exist.
    pub async fn ids_by_column(
        &self,
        column: &str,
        value: SqlValue,
    ) -> Result<Option<Vec<String>>, StoreError> {
        let column = sanitize_identifier(column).to_lowercase();
        if !self.column_exists(&column).await? {
            return Ok(None);
        }
        let statement = sql::select_ids(
            &self.table,
            &self.id_column,
            &column,
            self.created_column.as_deref(),
        );
        let rows = self.engine.query(&statement, vec![value]).await?;
        let ids = rows
            .iter()
            .filter_map(|row| Record::from_row(row).id(&self.id_column))
            .collect();
        Ok(Some(ids))
    }

    /// Substring search against the encoded blob column
    pub async fn search_blob(&self, needle: &str) -> Result<Vec<Record>, StoreError> {
        let key = self
            .keys
            .key("all_records", &self.kind, &[&self.blob_column, "enc", needle]);
        if let Some(cached) = self.cache.get_json::<Vec<Record>>(&key).await? {
            return Ok(cached);
        }
        let statement = sql::select_like(
            &self.table,
            &self.blob_column,
            self.created_column.as_deref(),
        );
        let pattern = format!("%{}%", sql::escape_like(needle));
        let rows = self
            .engine
            .query(&statement, vec![SqlValue::Text(pattern)])
            .await?;
        let records: Vec<Record> = rows.iter().map(Record::from_row).collect();
        self.cache.set_json(&key, &records).await?;
        Ok(records)
    }

    /// Fetch every row, newest first by default. Falls back to unordered
    /// when the requested sort column does not exist.
    pub async fn get_all(
        &self,
        order: Option<(&str, SortOrder)>,
    ) -> Result<Vec<Record>, StoreError> {
        let order = match order {
            Some((column, direction)) => {
                let column = sanitize_identifier(column).to_lowercase();
                if self.column_exists(&column).await? {
                    Some((column, direction))
                } else {
                    warn!(table = %self.table, %column, "sort column missing; returning unordered");
                    None
                }
            }
            None => self
                .created_column
                .clone()
                .map(|c| (c, SortOrder::Desc)),
        };

        let (order_col, order_dir) = match &order {
            Some((c, d)) => (c.as_str(), d.as_sql()),
            None => ("", ""),
        };
        let key = self
            .keys
            .key("all_records", &self.kind, &["order", order_col, order_dir]);
        if let Some(cached) = self.cache.get_json::<Vec<Record>>(&key).await? {
            return Ok(cached);
        }

        let statement = sql::select_all(
            &self.table,
            order.as_ref().map(|(c, d)| (c.as_str(), *d)),
        );
        let rows = self.engine.query(&statement, vec![]).await?;
        let records: Vec<Record> = rows.iter().map(Record::from_row).collect();
        self.cache.set_json(&key, &records).await?;
        Ok(records)
    }

    /// Whether the live table has the given column, read through the cache
    pub async fn column_exists(&self, column: &str) -> Result<bool, StoreError> {
        let column = sanitize_identifier(column).to_lowercase();
        let key = self.keys.key("columns", &self.kind, &[&column]);
        if let Some(cached) = self.cache.get_json::<bool>(&key).await? {
            return Ok(cached);
        }
        let live = introspect_columns(self.engine.as_ref(), &self.table).await?;
        let exists = live.contains_key(&column);
        self.cache.set_json(&key, &exists).await?;
        Ok(exists)
    }

    fn id_param(&self, id: &str) -> SqlValue {
        match id.parse::<i64>() {
            Ok(n) => SqlValue::Integer(n),
            Err(_) => SqlValue::Text(id.to_string()),
        }
    }

    async fn invalidate_rows(&self) {
        let scope = self.keys.row_scope(&self.kind);
        if let Err(err) = self.cache.delete_prefix(&scope).await {
            warn!(%scope, error = %err, "row cache invalidation failed");
        }
    }
}

/// Compact text form of a value for use inside a cache key
fn value_token(value: &SqlValue) -> String {
    match value {
        SqlValue::Text(s) => s.clone(),
        SqlValue::Integer(i) => i.to_string(),
        SqlValue::Float(f) => f.to_string(),
        SqlValue::Boolean(b) => b.to_string(),
        SqlValue::Timestamp(t) => t.timestamp().to_string(),
        SqlValue::Null => "null".to_string(),
    }
}
