//! Cache store interface
//!
//! The record store never reaches for an ambient cache; it is handed a
//! [`CacheStore`] at construction, so tests can substitute the in-memory
//! implementation.

use crate::errors::CacheError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Key/value cache with prefix-wildcard deletion
#[async_trait]
pub trait CacheStore: Send + Sync + Debug {
    /// Look up a cache entry; `None` is a miss
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a cache entry
    async fn set(&self, key: &str, value: String) -> Result<(), CacheError>;

    /// Delete every entry whose key starts with `prefix`; returns the number
    /// of entries removed
    async fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheError>;
}

/// JSON convenience layer over [`CacheStore`].
///
/// Values are stored as JSON strings, so a cached "found nothing" (`null`)
/// stays distinguishable from a cache miss.
#[async_trait]
pub trait CacheStoreExt: CacheStore {
    async fn get_json<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set_json<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize + Sync,
    {
        let raw = serde_json::to_string(value)?;
        self.set(key, raw).await
    }
}

#[async_trait]
impl<C: CacheStore + ?Sized> CacheStoreExt for C {}
