//! Record Store - Core persistence layer for shadowstore
//!
//! This crate provides the storage-engine abstraction, the schema
//! synchronizer, row-level CRUD with a read-through cache, and the object
//! mapper that bridges domain objects to blob + shadow-column rows.

pub mod engine;
pub mod errors;
pub mod mapper;
pub mod prelude;
pub mod record;
pub mod schema;
pub mod sql;
pub mod sqlite;
pub mod store;
pub mod traits;
pub mod value;

pub use cache_system::CacheParams;
pub use engine::{EngineError, SqlRow, StorageEngine};
pub use errors::StoreError;
pub use mapper::ObjectMapper;
pub use record::Record;
pub use schema::SchemaSync;
pub use sqlite::SqliteEngine;
pub use store::{RecordStore, SortOrder};
pub use structure_registry::Dialect;
pub use traits::Entity;
pub use value::SqlValue;
