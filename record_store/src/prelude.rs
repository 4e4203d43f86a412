//! Common imports for working with the record store

pub use crate::engine::{EngineError, SqlRow, StorageEngine};
pub use crate::errors::StoreError;
pub use crate::mapper::ObjectMapper;
pub use crate::record::Record;
pub use crate::schema::SchemaSync;
pub use crate::sql::SortOrder;
pub use crate::sqlite::SqliteEngine;
pub use crate::store::RecordStore;
pub use crate::traits::Entity;
pub use crate::value::SqlValue;
pub use cache_system::{CacheParams, CacheStore, CacheStoreExt, MemoryCache};
pub use structure_registry::{ColumnType, DeclaredStructure, Dialect, StructureRegistry};
