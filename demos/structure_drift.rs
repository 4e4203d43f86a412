//! Structure synchronization walkthrough: a declaration that grows between
//! deploys, reconciled against the live table.
//!
//! Run with: cargo run --example structure_drift

use std::sync::Arc;

use shadowstore::prelude::*;
use shadowstore::ShadowStore;

fn version_one() -> DeclaredStructure {
    DeclaredStructure::new()
        .column("id", ColumnType::Identity)
        .column("widget", ColumnType::Blob)
        .column("owner_id", ColumnType::Int)
        .column("created_at", ColumnType::Timestamp)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let engine = Arc::new(SqliteEngine::connect("sqlite::memory:").await?);
    let cache = CacheParams::new(Arc::new(MemoryCache::new()), "demo_");

    // First deploy creates the table
    let mut store = ShadowStore::new(engine.clone(), cache.clone(), &StoreConfig::default());
    store.declare_structure("widget", version_one()).await?;
    println!("deploy 1: table created");

    // Second deploy declares two more columns
    let mut store = ShadowStore::new(engine, cache, &StoreConfig::default());
    let version_two = version_one()
        .column("status", ColumnType::Varchar(50))
        .column("weight", ColumnType::Float);

    let in_sync = store.declare_structure("widget", version_two).await?;
    println!("deploy 2: synchronized = {in_sync}");

    let diff = store.structure_diff("widget").await?;
    println!(
        "after sync: {} to add, {} to modify, {} live-only",
        diff.add.len(),
        diff.modify.len(),
        diff.remove.len()
    );

    let records = store.record_store("widget").await?;
    println!(
        "status column exists: {}",
        records.column_exists("status").await?
    );
    Ok(())
}
