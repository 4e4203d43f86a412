//! Object mapping walkthrough: declare a kind, store and query objects.
//!
//! Run with: cargo run --example widgets

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use shadowstore::prelude::*;
use shadowstore::ShadowStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Widget {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    created_at: Option<chrono::DateTime<chrono::Utc>>,
    name: String,
    owner_id: i64,
    tags: Vec<String>,
}

impl Entity for Widget {
    fn kind() -> &'static str {
        "widget"
    }

    fn indexed_fields() -> &'static [&'static str] {
        &["name", "owner_id"]
    }

    fn id(&self) -> Option<String> {
        self.id.clone()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.created_at
    }

    fn set_created_at(&mut self, at: chrono::DateTime<chrono::Utc>) {
        self.created_at = Some(at);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let engine = Arc::new(SqliteEngine::connect("sqlite::memory:").await?);
    let cache = CacheParams::new(Arc::new(MemoryCache::new()), "demo_");
    let mut store = ShadowStore::new(engine, cache, &StoreConfig::default());

    let structure = DeclaredStructure::new()
        .column("id", ColumnType::Identity)
        .column("widget", ColumnType::Blob)
        .column("name", ColumnType::Varchar(100))
        .column("owner_id", ColumnType::Int)
        .column("created_at", ColumnType::Timestamp);
    store.declare_structure("widget", structure).await?;

    let widgets = store.mapper::<Widget>().await?;

    let mut gear = Widget {
        id: None,
        created_at: None,
        name: "gear".to_string(),
        owner_id: 7,
        tags: vec!["red".to_string(), "blue".to_string()],
    };
    let id = widgets.create(&mut gear).await?;
    println!("created widget {id} at {:?}", gear.created_at);

    let mut sprocket = Widget {
        id: None,
        created_at: None,
        name: "sprocket".to_string(),
        owner_id: 7,
        tags: vec!["red".to_string()],
    };
    widgets.create(&mut sprocket).await?;

    // Shadow-column lookup
    let owned = widgets.get_by_property("owner_id", &json!(7), false).await?;
    println!("owner 7 has {} widgets", owned.len());

    // Array membership search against the encoded blob
    let red = widgets.get_by_property("tags", &json!("red"), true).await?;
    println!(
        "tagged red: {:?}",
        red.iter().map(|w| w.name.as_str()).collect::<Vec<_>>()
    );

    // Partial update through the property surface
    let mut props = std::collections::HashMap::new();
    props.insert("name".to_string(), json!("big gear"));
    widgets.update_properties(&id, props).await?;
    let reloaded = widgets.get(&id).await?.expect("widget still stored");
    println!("renamed to {}", reloaded.name);

    widgets.delete_all().await?;
    Ok(())
}
