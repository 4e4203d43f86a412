//! # ShadowStore
//!
//! A schema-synchronizing object persistence layer. Entity kinds declare
//! their table structure up front; tables are created and altered to match
//! at startup. Objects are stored whole in a kind-named blob column, with
//! selected fields mirrored into shadow columns for SQL lookups, and every
//! read goes through a cache with prefix-wildcard invalidation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shadowstore::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Widget {
//!     #[serde(default)]
//!     pub id: Option<String>,
//!     #[serde(default)]
//!     pub created_at: Option<chrono::DateTime<chrono::Utc>>,
//!     pub name: String,
//!     pub owner_id: i64,
//! }
//!
//! impl Entity for Widget {
//!     fn kind() -> &'static str { "widget" }
//!     fn indexed_fields() -> &'static [&'static str] { &["owner_id"] }
//!     fn id(&self) -> Option<String> { self.id.clone() }
//!     fn set_id(&mut self, id: String) { self.id = Some(id); }
//!     fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> { self.created_at }
//!     fn set_created_at(&mut self, at: chrono::DateTime<chrono::Utc>) {
//!         self.created_at = Some(at);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = std::sync::Arc::new(SqliteEngine::connect("sqlite::memory:").await?);
//!     let cache = CacheParams::new(std::sync::Arc::new(MemoryCache::new()), "ss_");
//!     let mut store = ShadowStore::new(engine, cache, &StoreConfig::default());
//!
//!     let structure = DeclaredStructure::new()
//!         .column("id", ColumnType::Identity)
//!         .column("widget", ColumnType::Blob)
//!         .column("name", ColumnType::Varchar(100))
//!         .column("owner_id", ColumnType::Int)
//!         .column("created_at", ColumnType::Timestamp);
//!     store.declare_structure("widget", structure).await?;
//!
//!     let widgets = store.mapper::<Widget>().await?;
//!     let mut widget = Widget {
//!         id: None,
//!         created_at: None,
//!         name: "gear".to_string(),
//!         owner_id: 7,
//!     };
//!     let id = widgets.create(&mut widget).await?;
//!     println!("Created widget {}", id);
//!
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod prelude;
pub mod sync;

// Re-export the main public types for convenience
pub use core::ShadowStore;
pub use errors::ShadowStoreError;

// Re-export centralized config
pub use config::{AppConfig, CacheSettings, EngineConfig, StoreConfig};

// Re-export the member crates behind the public API
pub use cache_system;
pub use record_store;
pub use structure_registry;

// Re-export external dependencies used in public API
pub use async_trait;
pub use sqlx;
