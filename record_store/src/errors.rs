use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Engine error: {0}")]
    Engine(#[from] crate::engine::EngineError),

    #[error("Cache error: {0}")]
    Cache(#[from] cache_system::CacheError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
