//! Storage engine abstraction
//!
//! The persistence layer never talks to a database driver directly; it emits
//! parameterized statements through this trait. Identifiers are sanitized by
//! the statement builders before they reach an engine, and every value is
//! passed as a bound parameter.

use crate::value::SqlValue;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use thiserror::Error;

pub use structure_registry::Dialect;

/// One result row, as a column name to value map
pub type SqlRow = HashMap<String, SqlValue>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// A relational backing store
#[async_trait]
pub trait StorageEngine: Send + Sync + Debug {
    /// The SQL dialect this engine speaks; statement builders key off it
    fn dialect(&self) -> Dialect;

    /// Execute a statement; returns the number of rows affected
    async fn execute(&self, sql: &str, params: Vec<SqlValue>) -> Result<u64, EngineError>;

    /// Execute an insert; returns the generated identity value
    async fn insert(&self, sql: &str, params: Vec<SqlValue>) -> Result<i64, EngineError>;

    /// Run a query and return every row
    async fn query(&self, sql: &str, params: Vec<SqlValue>) -> Result<Vec<SqlRow>, EngineError>;
}
