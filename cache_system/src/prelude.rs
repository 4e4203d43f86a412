//! Convenience re-exports for cache-system consumers

pub use crate::errors::CacheError;
pub use crate::keys::KeyBuilder;
pub use crate::memory::MemoryCache;
pub use crate::params::CacheParams;
pub use crate::redis_store::RedisCache;
pub use crate::store::{CacheStore, CacheStoreExt};
pub use config::CacheSettings;
