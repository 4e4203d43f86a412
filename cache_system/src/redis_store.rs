//! Redis cache backend
//!
//! Shares one multiplexed connection per store, created lazily on first use.
//! Prefix invalidation scans matching keys with a pattern and deletes them in
//! one round trip.

use crate::errors::CacheError;
use crate::store::CacheStore;
use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Redis-backed cache store
#[derive(Clone)]
pub struct RedisCache {
    client: Arc<Client>,
    connection: Arc<RwLock<Option<redis::aio::MultiplexedConnection>>>,
}

impl Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let connection_status = match self.connection.try_read() {
            Ok(conn) => {
                if conn.is_some() {
                    "connected"
                } else {
                    "no_connection"
                }
            }
            Err(_) => "lock_error",
        };

        f.debug_struct("RedisCache")
            .field("connected", &connection_status)
            .finish()
    }
}

impl RedisCache {
    /// Create a new Redis cache store
    pub fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;

        Ok(Self {
            client: Arc::new(client),
            connection: Arc::new(RwLock::new(None)),
        })
    }

    /// Get or create the shared multiplexed connection
    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, CacheError> {
        let mut conn = self.connection.write().await;

        if conn.is_none() {
            let connection = self.client.get_multiplexed_async_connection().await?;
            *conn = Some(connection);
        }

        Ok(conn
            .as_ref()
            .ok_or_else(|| CacheError::Connection("Failed to open Redis connection".into()))?
            .clone())
    }

    /// Ping Redis to check connectivity
    pub async fn ping(&self) -> Result<String, CacheError> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong)
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        let mut conn = self.get_connection().await?;
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let pattern = format!("{}*", prefix);
        let mut conn = self.get_connection().await?;

        let keys: Vec<String> = conn.keys(&pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let deleted: u64 = conn.del(keys).await?;
        Ok(deleted)
    }
}
