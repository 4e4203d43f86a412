//! Cache behavior observable from outside: read-through freshness after
//! mutations, cached empty results, and the independence of the row and
//! structure partitions.

use std::collections::HashMap;
use std::sync::Arc;

use shadowstore::prelude::*;
use shadowstore::ShadowStore;

fn widget_structure() -> DeclaredStructure {
    DeclaredStructure::new()
        .column("id", ColumnType::Identity)
        .column("widget", ColumnType::Blob)
        .column("owner_id", ColumnType::Int)
        .column("created_at", ColumnType::Timestamp)
}

async fn store_with_widgets() -> ShadowStore {
    let engine = Arc::new(SqliteEngine::connect("sqlite::memory:").await.unwrap());
    let cache = CacheParams::new(Arc::new(MemoryCache::new()), "test_");
    let mut store = ShadowStore::new(engine, cache, &StoreConfig::default());
    assert!(store
        .declare_structure("widget", widget_structure())
        .await
        .unwrap());
    store
}

fn blob_row(blob: &str) -> HashMap<String, SqlValue> {
    let mut data = HashMap::new();
    data.insert("widget".to_string(), SqlValue::from(blob));
    data
}

#[tokio::test]
async fn reads_are_served_from_cache_until_a_mutation() {
    let store = store_with_widgets().await;
    let records = store.record_store("widget").await.unwrap();
    let id = records.insert(Some(blob_row("old"))).await.unwrap();

    // Prime the cache, then change the row without going through the store
    assert_eq!(
        records.get_by_id(&id).await.unwrap().unwrap().text("widget"),
        Some("old")
    );
    store
        .engine()
        .execute(
            "UPDATE ss_widget SET widget = ? WHERE id = ?",
            vec![
                SqlValue::from("sneaky"),
                SqlValue::from(id.parse::<i64>().unwrap()),
            ],
        )
        .await
        .unwrap();
    assert_eq!(
        records.get_by_id(&id).await.unwrap().unwrap().text("widget"),
        Some("old")
    );

    // Any mutation through the store clears the kind's row partition
    let other = records.insert(Some(blob_row("x"))).await.unwrap();
    assert_ne!(other, id);
    assert_eq!(
        records.get_by_id(&id).await.unwrap().unwrap().text("widget"),
        Some("sneaky")
    );
}

#[tokio::test]
async fn empty_results_are_cached_too() {
    let store = store_with_widgets().await;
    let records = store.record_store("widget").await.unwrap();

    // Both lookups miss; the second is answered by the cached null
    assert!(records.get_by_id("999").await.unwrap().is_none());
    assert!(records.get_by_id("999").await.unwrap().is_none());

    // After an insert the id exists and the stale null is gone
    let id = records.insert(Some(blob_row("a"))).await.unwrap();
    assert!(records.get_by_id(&id).await.unwrap().is_some());
}

#[tokio::test]
async fn row_mutations_leave_the_structure_partition_alone() {
    let store = store_with_widgets().await;
    let records = store.record_store("widget").await.unwrap();

    assert!(records.column_exists("owner_id").await.unwrap());
    assert!(!records.column_exists("status").await.unwrap());

    // Row traffic must not clear structure answers
    records.insert(Some(blob_row("a"))).await.unwrap();
    assert!(!records.column_exists("status").await.unwrap());
}

#[tokio::test]
async fn structure_changes_refresh_structure_answers() {
    let mut store = store_with_widgets().await;
    let records = store.record_store("widget").await.unwrap();
    assert!(!records.column_exists("status").await.unwrap());

    let grown = widget_structure().column("status", ColumnType::Varchar(50));
    assert!(store.declare_structure("widget", grown).await.unwrap());

    // The alter cleared the structure partition, so this re-introspects
    assert!(records.column_exists("status").await.unwrap());
}

#[tokio::test]
async fn parameterized_reads_share_the_row_partition() {
    let store = store_with_widgets().await;
    let records = store.record_store("widget").await.unwrap();

    let mut data = blob_row("a");
    data.insert("owner_id".to_string(), SqlValue::from(7i64));
    records.insert(Some(data)).await.unwrap();

    let matches = records
        .get_all_by_column("owner_id", SqlValue::from(7i64))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(matches.len(), 1);

    // A second insert for the same owner invalidates the parameterized read
    let mut data = blob_row("b");
    data.insert("owner_id".to_string(), SqlValue::from(7i64));
    records.insert(Some(data)).await.unwrap();

    let matches = records
        .get_all_by_column("owner_id", SqlValue::from(7i64))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(matches.len(), 2);
}

#[tokio::test]
async fn cache_keys_are_namespaced_per_kind() {
    let mut store = store_with_widgets().await;
    let gadget = DeclaredStructure::new()
        .column("id", ColumnType::Identity)
        .column("gadget", ColumnType::Blob)
        .column("created_at", ColumnType::Timestamp);
    assert!(store.declare_structure("gadget", gadget).await.unwrap());

    let widgets = store.record_store("widget").await.unwrap();
    let gadgets = store.record_store("gadget").await.unwrap();

    let id = widgets.insert(Some(blob_row("w"))).await.unwrap();
    assert!(widgets.get_by_id(&id).await.unwrap().is_some());

    // Mutating gadgets must not disturb the cached widget read
    let gid = gadgets.insert(None).await.unwrap();
    assert!(gadgets.get_by_id(&gid).await.unwrap().is_some());
    assert!(widgets.get_by_id(&id).await.unwrap().is_some());
}
