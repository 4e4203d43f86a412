//! SQLite storage engine
//!
//! The bundled engine implementation, backed by an `sqlx` connection pool.
//! SQLite's dynamic typing means result columns are decoded by the value's
//! runtime storage class, not the declared column type.

use crate::engine::{EngineError, SqlRow, StorageEngine};
use crate::value::SqlValue;
use async_trait::async_trait;
use config::EngineConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use std::str::FromStr;
use std::time::Duration;
use structure_registry::Dialect;

/// SQLite-backed storage engine
#[derive(Debug, Clone)]
pub struct SqliteEngine {
    pool: SqlitePool,
}

impl SqliteEngine {
    /// Connect with a single pooled connection.
    ///
    /// A `sqlite::memory:` URL gives a private database per connection, so
    /// the pool is capped at one connection to keep it stable; use
    /// [`SqliteEngine::from_config`] for file-backed databases.
    pub async fn connect(database_url: &str) -> Result<Self, EngineError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(EngineError::Database)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Connect using the engine section of the application config.
    ///
    /// In-memory URLs get the same single-connection cap as
    /// [`SqliteEngine::connect`] regardless of the configured pool size.
    pub async fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(EngineError::Database)?
            .create_if_missing(true);
        let max_connections =
            effective_max_connections(&config.database_url, config.max_connections);
        if max_connections < config.max_connections {
            tracing::warn!(
                configured = config.max_connections,
                "in-memory database; capping pool at one connection"
            );
        }
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Every connection to an in-memory database gets its own private database,
/// so anything beyond one pooled connection would hand out disjoint stores.
fn effective_max_connections(database_url: &str, configured: u32) -> u32 {
    if database_url.contains(":memory:") || database_url.contains("mode=memory") {
        1
    } else {
        configured
    }
}

fn bind_params(
    sql: &str,
    params: Vec<SqlValue>,
) -> sqlx::query::Query<'_, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'_>> {
    let mut query = sqlx::query(sql);
    for value in params {
        query = match value {
            SqlValue::Text(s) => query.bind(s),
            SqlValue::Integer(i) => query.bind(i),
            SqlValue::Float(f) => query.bind(f),
            SqlValue::Boolean(b) => query.bind(b),
            SqlValue::Timestamp(t) => query.bind(t.format("%Y-%m-%d %H:%M:%S").to_string()),
            SqlValue::Null => query.bind(Option::<String>::None),
        };
    }
    query
}

fn decode_row(row: &SqliteRow) -> SqlRow {
    let mut out = SqlRow::new();
    for column in row.columns() {
        let idx = column.ordinal();
        // Decode by the value's storage class; SQLite columns are not
        // guaranteed to hold the declared type
        let storage_class = match row.try_get_raw(idx) {
            Ok(raw) => {
                if raw.is_null() {
                    None
                } else {
                    Some(raw.type_info().name().to_string())
                }
            }
            Err(_) => None,
        };
        let value = match storage_class.as_deref() {
            None => SqlValue::Null,
            Some("INTEGER") => row
                .try_get::<i64, _>(idx)
                .map(SqlValue::Integer)
                .unwrap_or(SqlValue::Null),
            Some("REAL") => row
                .try_get::<f64, _>(idx)
                .map(SqlValue::Float)
                .unwrap_or(SqlValue::Null),
            Some(_) => row
                .try_get::<String, _>(idx)
                .map(SqlValue::Text)
                .unwrap_or(SqlValue::Null),
        };
        out.insert(column.name().to_string(), value);
    }
    out
}

#[async_trait]
impl StorageEngine for SqliteEngine {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn execute(&self, sql: &str, params: Vec<SqlValue>) -> Result<u64, EngineError> {
        let result = bind_params(sql, params).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn insert(&self, sql: &str, params: Vec<SqlValue>) -> Result<i64, EngineError> {
        let result = bind_params(sql, params).execute(&self.pool).await?;
        Ok(result.last_insert_rowid())
    }

    async fn query(&self, sql: &str, params: Vec<SqlValue>) -> Result<Vec<SqlRow>, EngineError> {
        let rows = bind_params(sql, params).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(decode_row).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn execute_insert_query_round_trip() {
        let engine = SqliteEngine::connect("sqlite::memory:").await.unwrap();
        engine
            .execute(
                "CREATE TABLE t (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, score REAL)",
                vec![],
            )
            .await
            .unwrap();

        let id = engine
            .insert(
                "INSERT INTO t (name, score) VALUES (?, ?)",
                vec![SqlValue::Text("a".into()), SqlValue::Float(1.5)],
            )
            .await
            .unwrap();
        assert_eq!(id, 1);

        let rows = engine
            .query("SELECT * FROM t WHERE id = ?", vec![SqlValue::Integer(id)])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&SqlValue::Text("a".into())));
        assert_eq!(rows[0].get("score"), Some(&SqlValue::Float(1.5)));
        assert_eq!(rows[0].get("id"), Some(&SqlValue::Integer(1)));
    }

    #[tokio::test]
    async fn null_columns_decode_as_null() {
        let engine = SqliteEngine::connect("sqlite::memory:").await.unwrap();
        engine
            .execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)", vec![])
            .await
            .unwrap();
        engine
            .insert("INSERT INTO t (id) VALUES (?)", vec![SqlValue::Integer(1)])
            .await
            .unwrap();
        let rows = engine.query("SELECT * FROM t", vec![]).await.unwrap();
        assert_eq!(rows[0].get("name"), Some(&SqlValue::Null));
    }

    #[test]
    fn in_memory_urls_are_capped_at_one_connection() {
        assert_eq!(effective_max_connections("sqlite::memory:", 5), 1);
        assert_eq!(
            effective_max_connections("sqlite://file:shared?mode=memory&cache=shared", 8),
            1
        );
        assert_eq!(effective_max_connections("sqlite://widgets.db", 5), 5);
    }

    #[tokio::test]
    async fn config_with_oversized_pool_still_sees_one_database() {
        let config = EngineConfig::new("sqlite::memory:".to_string(), 5, 5, 60);
        let engine = SqliteEngine::from_config(&config).await.unwrap();
        engine
            .execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", vec![])
            .await
            .unwrap();

        // Every statement lands on the same connection, so the table is
        // visible to all of them
        for i in 1..=5 {
            engine
                .insert("INSERT INTO t (id) VALUES (?)", vec![SqlValue::Integer(i)])
                .await
                .unwrap();
        }
        let rows = engine.query("SELECT id FROM t", vec![]).await.unwrap();
        assert_eq!(rows.len(), 5);
    }
}
