//! Cache layer for shadowstore
//!
//! This crate provides the injected cache interface that fronts every read in
//! the record store: deterministic key construction, prefix-wildcard
//! invalidation, and two backends (in-memory and Redis).

pub mod errors;
pub mod keys;
pub mod memory;
pub mod params;
pub mod prelude;
pub mod redis_store;
pub mod store;

// Re-export centralized config
pub use config::CacheSettings;

pub use errors::CacheError;
pub use keys::KeyBuilder;
pub use memory::MemoryCache;
pub use params::CacheParams;
pub use redis_store::RedisCache;
pub use store::{CacheStore, CacheStoreExt};
