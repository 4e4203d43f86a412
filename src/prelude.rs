//! Convenience re-exports for common shadowstore usage
//!
//! # Example
//!
//! ```rust
//! use shadowstore::prelude::*;
//!
//! // Now you have access to all the common shadowstore types and traits
//! ```

// Core coordinator
pub use crate::core::ShadowStore;
pub use crate::errors::ShadowStoreError;

// Re-export centralized config
pub use config::{AppConfig, CacheSettings, EngineConfig, StoreConfig};

// Structure declaration and synchronization
pub use structure_registry::{
    ColumnType, DeclaredStructure, Dialect, StructureDiff, StructureRegistry,
};

// Record store and object mapping
pub use record_store::prelude::*;

// Cache layer
pub use cache_system::prelude::*;

// Common external dependencies
pub use anyhow;
pub use async_trait;
pub use sqlx;
pub use tokio;
