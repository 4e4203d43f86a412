//! Error types for the shadowstore crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShadowStoreError {
    #[error("Store error: {0}")]
    Store(#[from] record_store::StoreError),

    #[error("Engine error: {0}")]
    Engine(#[from] record_store::EngineError),

    #[error("Cache error: {0}")]
    Cache(#[from] cache_system::CacheError),

    #[error("Registry error: {0}")]
    Registry(#[from] structure_registry::RegistryError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("No structure declared for kind: {0}")]
    KindNotDeclared(String),
}
