//! Cache parameter bundle
//!
//! Groups the backend handle with the key namespace so a record store can be
//! wired up with one value.

use crate::errors::CacheError;
use crate::keys::KeyBuilder;
use crate::memory::MemoryCache;
use crate::redis_store::RedisCache;
use crate::store::CacheStore;
use config::CacheSettings;
use std::sync::Arc;

/// Cache wiring handed to a record store at construction
#[derive(Debug, Clone)]
pub struct CacheParams {
    /// The cache backend
    pub store: Arc<dyn CacheStore>,
    /// Key prefix namespace for this deployment
    pub prefix: String,
}

impl CacheParams {
    pub fn new(store: Arc<dyn CacheStore>, prefix: &str) -> Self {
        Self {
            store,
            prefix: prefix.to_string(),
        }
    }

    /// Build the backend from settings: Redis when a URL is configured,
    /// the in-memory store otherwise
    pub fn from_settings(settings: &CacheSettings) -> Result<Self, CacheError> {
        let store: Arc<dyn CacheStore> = match &settings.redis_url {
            Some(url) => Arc::new(RedisCache::new(url)?),
            None => Arc::new(MemoryCache::new()),
        };
        Ok(Self::new(store, &settings.key_prefix))
    }

    pub fn keys(&self) -> KeyBuilder {
        KeyBuilder::new(self.prefix.clone())
    }
}
