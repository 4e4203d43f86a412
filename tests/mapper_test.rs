//! End-to-end object mapping: create, reload in a later session, property
//! lookups through shadow columns, array membership search, and cleanup.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shadowstore::prelude::*;
use shadowstore::ShadowStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Widget {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    name: String,
    owner_id: i64,
    tags: Vec<String>,
}

impl Widget {
    fn new(name: &str, owner_id: i64, tags: &[&str]) -> Self {
        Self {
            id: None,
            created_at: None,
            name: name.to_string(),
            owner_id,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
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

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }
}

fn widget_structure() -> DeclaredStructure {
    DeclaredStructure::new()
        .column("id", ColumnType::Identity)
        .column("widget", ColumnType::Blob)
        .column("name", ColumnType::Varchar(100))
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

#[tokio::test]
async fn object_round_trips_across_sessions() {
    let store = store_with_widgets().await;
    let widgets = store.mapper::<Widget>().await.unwrap();

    let mut widget = Widget::new("gear", 7, &["red", "blue"]);
    let id = widgets.create(&mut widget).await.unwrap();
    assert_eq!(widget.id, Some(id.clone()));
    assert!(widget.created_at.is_some());

    // A second coordinator over the same engine, declared afresh, sees it
    let mut session = ShadowStore::new(
        store.engine(),
        store.cache().clone(),
        &StoreConfig::default(),
    );
    assert!(session
        .declare_structure("widget", widget_structure())
        .await
        .unwrap());
    let widgets = session.mapper::<Widget>().await.unwrap();
    let loaded = widgets.get(&id).await.unwrap().unwrap();
    assert_eq!(loaded.name, "gear");
    assert_eq!(loaded.owner_id, 7);
    assert_eq!(loaded.tags, vec!["red", "blue"]);
    assert_eq!(loaded.created_at, widget.created_at);
}

#[tokio::test]
async fn shadow_columns_answer_property_lookups() {
    let store = store_with_widgets().await;
    let widgets = store.mapper::<Widget>().await.unwrap();

    widgets.create(&mut Widget::new("a", 1, &[])).await.unwrap();
    widgets.create(&mut Widget::new("b", 1, &[])).await.unwrap();
    widgets.create(&mut Widget::new("c", 2, &[])).await.unwrap();

    let owned = widgets
        .get_by_property("owner_id", &json!(1), false)
        .await
        .unwrap();
    assert_eq!(owned.len(), 2);

    let named = widgets
        .get_by_property("name", &json!("c"), false)
        .await
        .unwrap();
    assert_eq!(named.len(), 1);
    assert_eq!(named[0].owner_id, 2);
}

#[tokio::test]
async fn saving_keeps_blob_and_shadow_columns_consistent() {
    let store = store_with_widgets().await;
    let widgets = store.mapper::<Widget>().await.unwrap();

    let mut widget = Widget::new("gear", 7, &[]);
    let id = widgets.create(&mut widget).await.unwrap();
    widget.owner_id = 8;
    assert!(widgets.save(&id, &widget).await.unwrap());

    // Both the SQL-visible column and the decoded blob agree
    let by_column = widgets
        .get_by_property("owner_id", &json!(8), false)
        .await
        .unwrap();
    assert_eq!(by_column.len(), 1);
    assert_eq!(by_column[0].owner_id, 8);
    assert!(widgets
        .get_by_property("owner_id", &json!(7), false)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn array_membership_search_is_exact() {
    let store = store_with_widgets().await;
    let widgets = store.mapper::<Widget>().await.unwrap();

    widgets
        .create(&mut Widget::new("a", 1, &["red", "blue"]))
        .await
        .unwrap();
    widgets
        .create(&mut Widget::new("b", 2, &["redder"]))
        .await
        .unwrap();
    widgets
        .create(&mut Widget::new("c", 3, &["green"]))
        .await
        .unwrap();

    let hits = widgets
        .get_by_property("tags", &json!("red"), true)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "a");
}

#[tokio::test]
async fn unindexed_property_falls_back_to_scanning() {
    let store = store_with_widgets().await;
    let widgets = store.mapper::<Widget>().await.unwrap();

    widgets
        .create(&mut Widget::new("a", 1, &["x"]))
        .await
        .unwrap();
    widgets
        .create(&mut Widget::new("b", 2, &["y"]))
        .await
        .unwrap();

    let hits = widgets
        .get_by_property("tags", &json!("x"), false)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "a");
}

#[tokio::test]
async fn update_properties_edits_in_place() {
    let store = store_with_widgets().await;
    let widgets = store.mapper::<Widget>().await.unwrap();

    let id = widgets
        .create(&mut Widget::new("gear", 7, &["red"]))
        .await
        .unwrap();

    let mut props = HashMap::new();
    props.insert("name".to_string(), json!("cog"));
    props.insert("tags".to_string(), json!(["blue"]));
    let updated = widgets.update_properties(&id, props).await.unwrap().unwrap();
    assert_eq!(updated.name, "cog");

    let loaded = widgets.get(&id).await.unwrap().unwrap();
    assert_eq!(loaded.name, "cog");
    assert_eq!(loaded.tags, vec!["blue"]);
    assert_eq!(loaded.owner_id, 7);
    assert_eq!(loaded.id, Some(id));
}

#[tokio::test]
async fn expiry_sweep_removes_only_old_objects() {
    let store = store_with_widgets().await;
    let widgets = store.mapper::<Widget>().await.unwrap();

    let mut fresh = Widget::new("fresh", 1, &[]);
    widgets.create(&mut fresh).await.unwrap();

    let mut old = Widget::new("old", 1, &[]);
    old.created_at = Some(Utc::now() - Duration::days(30));

    let expired = widgets
        .expired(7, Some(vec![fresh.clone(), old.clone()]))
        .await
        .unwrap();
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].name, "old");

    // Stored objects are all fresh
    assert!(widgets.expired(7, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn sorting_and_deleting_everything() {
    let store = store_with_widgets().await;
    let widgets = store.mapper::<Widget>().await.unwrap();

    widgets.create(&mut Widget::new("b", 2, &[])).await.unwrap();
    widgets.create(&mut Widget::new("c", 3, &[])).await.unwrap();
    widgets.create(&mut Widget::new("a", 1, &[])).await.unwrap();

    let all = widgets.get_all().await.unwrap();
    assert_eq!(all.len(), 3);

    let sorted = widgets.sort(all, "name", SortOrder::Asc);
    let names: Vec<&str> = sorted.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);

    assert_eq!(widgets.delete_all().await.unwrap(), 3);
    assert!(widgets.get_all().await.unwrap().is_empty());
}
