//! Object mapper
//!
//! Bridges domain objects to blob + shadow-column rows. The full object is
//! serialized into the blob column; fields named by
//! [`Entity::indexed_fields`] are copied into same-named columns so property
//! lookups can run in SQL. Rows whose blob no longer decodes are skipped on
//! read, not surfaced as errors.

use std::collections::HashMap;
use std::marker::PhantomData;

use chrono::{Duration, Utc};
use tracing::warn;

use crate::errors::StoreError;
use crate::record::Record;
use crate::sql::SortOrder;
use crate::store::RecordStore;
use crate::traits::Entity;
use crate::value::SqlValue;

/// Typed persistence facade for one entity kind
pub struct ObjectMapper<T: Entity> {
    store: RecordStore,
    scan_warn_threshold: usize,
    _entity: PhantomData<T>,
}

impl<T: Entity> ObjectMapper<T> {
    pub fn new(store: RecordStore, scan_warn_threshold: usize) -> Self {
        Self {
            store,
            scan_warn_threshold,
            _entity: PhantomData,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Persist a new object. The identity and creation timestamp are
    /// generated by the engine and written back into the object before the
    /// full state is saved, so the blob carries both.
    pub async fn create(&self, object: &mut T) -> Result<String, StoreError> {
        let id = self.store.insert(None).await?;
        object.set_id(id.clone());
        if let Some(record) = self.store.get_by_id(&id).await? {
            if let Some(created) = self
                .store
                .created_column()
                .and_then(|col| record.created_at(col))
            {
                object.set_created_at(created);
            }
        }
        self.save(&id, object).await?;
        Ok(id)
    }

    /// Write an object's current state over an existing row: blob plus one
    /// shadow column per indexed field that has a live column.
    pub async fn save(&self, id: &str, object: &T) -> Result<bool, StoreError> {
        let encoded = serde_json::to_value(object)?;
        let mut data = HashMap::new();
        data.insert(
            self.store.blob_column().to_string(),
            SqlValue::Text(encoded.to_string()),
        );
        for field in T::indexed_fields() {
            if !self.store.column_exists(field).await? {
                warn!(kind = %T::kind(), %field, "indexed field has no column; skipping shadow write");
                continue;
            }
            let value = encoded.get(*field).unwrap_or(&serde_json::Value::Null);
            data.insert(field.to_string(), SqlValue::from_json(value));
        }
        self.store.update(id, data).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        Ok(self
            .store
            .get_by_id(id)
            .await?
            .and_then(|record| self.decode(&record)))
    }

    /// Every stored object, newest first; undecodable rows are skipped
    pub async fn get_all(&self) -> Result<Vec<T>, StoreError> {
        let records = self.store.get_all(None).await?;
        Ok(self.decode_all(&records))
    }

    /// Objects whose property equals (or, for array properties, contains)
    /// the given value.
    ///
    /// With `search_in_arrays` the encoded blob is substring-searched for the
    /// JSON form of the value and candidates are confirmed in memory.
    /// Otherwise the lookup runs against the property's shadow column, with a
    /// full scan as the fallback when no such column exists.
    pub async fn get_by_property(
        &self,
        property: &str,
        value: &serde_json::Value,
        search_in_arrays: bool,
    ) -> Result<Vec<T>, StoreError> {
        if search_in_arrays {
            let needle = serde_json::to_string(value)?;
            let candidates = self.store.search_blob(&needle).await?;
            let objects = self.decode_all(&candidates);
            return Ok(self.filter(objects, property, value));
        }

        match self
            .store
            .get_all_by_column(property, SqlValue::from_json(value))
            .await?
        {
            Some(records) => Ok(self.decode_all(&records)),
            None => {
                let all = self.get_all().await?;
                if all.len() >= self.scan_warn_threshold {
                    warn!(
                        kind = %T::kind(),
                        %property,
                        objects = all.len(),
                        "property has no column; falling back to a full scan"
                    );
                }
                Ok(self.filter(all, property, value))
            }
        }
    }

    /// Keep the objects whose property equals the value, or whose array
    /// property contains it. Objects without the property never match.
    pub fn filter(&self, objects: Vec<T>, property: &str, value: &serde_json::Value) -> Vec<T> {
        objects
            .into_iter()
            .filter(|object| match serde_json::to_value(object) {
                Ok(encoded) => property_matches(&encoded, property, value),
                Err(_) => false,
            })
            .collect()
    }

    /// Sort objects by a property. Values of different JSON types order by
    /// type rank; objects missing the property sort first ascending.
    pub fn sort(&self, objects: Vec<T>, property: &str, order: SortOrder) -> Vec<T> {
        let mut decorated: Vec<(serde_json::Value, T)> = objects
            .into_iter()
            .map(|object| {
                let key = serde_json::to_value(&object)
                    .ok()
                    .and_then(|v| v.get(property).cloned())
                    .unwrap_or(serde_json::Value::Null);
                (key, object)
            })
            .collect();
        decorated.sort_by(|(a, _), (b, _)| {
            let ordering = cmp_json(a, b);
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        decorated.into_iter().map(|(_, object)| object).collect()
    }

    /// Overwrite a subset of an object's properties, save, and return the
    /// updated object. Keys that are not properties of the object are
    /// ignored. Returns `None` when no object with the id exists.
    pub async fn update_properties(
        &self,
        id: &str,
        properties: HashMap<String, serde_json::Value>,
    ) -> Result<Option<T>, StoreError> {
        let Some(current) = self.get(id).await? else {
            return Ok(None);
        };
        let mut encoded = serde_json::to_value(&current)?;
        let Some(map) = encoded.as_object_mut() else {
            return Ok(None);
        };
        for (key, value) in properties {
            if map.contains_key(&key) {
                map.insert(key, value);
            } else {
                warn!(kind = %T::kind(), property = %key, "ignoring unknown property in update");
            }
        }
        let mut updated: T = serde_json::from_value(encoded)?;
        updated.set_id(id.to_string());
        if let Some(created) = current.created_at() {
            updated.set_created_at(created);
        }
        self.save(id, &updated).await?;
        Ok(Some(updated))
    }

    /// Objects older than `max_age_days`. When `objects` is given, the check
    /// runs over that set instead of loading everything. Objects without a
    /// creation timestamp are never considered expired.
    pub async fn expired(
        &self,
        max_age_days: i64,
        objects: Option<Vec<T>>,
    ) -> Result<Vec<T>, StoreError> {
        let pool = match objects {
            Some(objects) => objects,
            None => self.get_all().await?,
        };
        let cutoff = Utc::now() - Duration::days(max_age_days);
        Ok(pool
            .into_iter()
            .filter(|object| matches!(object.created_at(), Some(created) if created < cutoff))
            .collect())
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete(id).await
    }

    /// Delete a set of objects; unpersisted objects are skipped. Returns how
    /// many rows were removed.
    pub async fn delete_many(&self, objects: &[T]) -> Result<u64, StoreError> {
        let mut deleted = 0;
        for object in objects {
            let Some(id) = object.id() else {
                warn!(kind = %T::kind(), "skipping delete of object with no identity");
                continue;
            };
            if self.store.delete(&id).await? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    /// Delete every row of the kind, decodable or not
    pub async fn delete_all(&self) -> Result<u64, StoreError> {
        let records = self.store.get_all(None).await?;
        let mut deleted = 0;
        for record in &records {
            if let Some(id) = record.id(self.store.id_column()) {
                if self.store.delete(&id).await? {
                    deleted += 1;
                }
            }
        }
        Ok(deleted)
    }

    fn decode_all(&self, records: &[Record]) -> Vec<T> {
        records
            .iter()
            .filter_map(|record| self.decode(record))
            .collect()
    }

    /// Decode the blob and write the row-owned columns back into the object.
    /// A row whose blob is missing or stale is logged and skipped.
    fn decode(&self, record: &Record) -> Option<T> {
        let blob = match record.text(self.store.blob_column()) {
            Some(blob) => blob,
            None => {
                warn!(kind = %T::kind(), "row has no encoded object; skipping");
                return None;
            }
        };
        let mut object: T = match serde_json::from_str(blob) {
            Ok(object) => object,
            Err(err) => {
                warn!(kind = %T::kind(), error = %err, "undecodable object blob; skipping");
                return None;
            }
        };
        if let Some(id) = record.id(self.store.id_column()) {
            object.set_id(id);
        }
        if let Some(created) = self
            .store
            .created_column()
            .and_then(|col| record.created_at(col))
        {
            object.set_created_at(created);
        }
        Some(object)
    }
}

fn property_matches(encoded: &serde_json::Value, property: &str, value: &serde_json::Value) -> bool {
    match encoded.get(property) {
        Some(serde_json::Value::Array(items)) => items.contains(value),
        Some(actual) => actual == value,
        None => false,
    }
}

fn type_rank(value: &serde_json::Value) -> u8 {
    match value {
        serde_json::Value::Null => 0,
        serde_json::Value::Bool(_) => 1,
        serde_json::Value::Number(_) => 2,
        serde_json::Value::String(_) => 3,
        serde_json::Value::Array(_) => 4,
        serde_json::Value::Object(_) => 5,
    }
}

fn cmp_json(a: &serde_json::Value, b: &serde_json::Value) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (serde_json::Value::Bool(a), serde_json::Value::Bool(b)) => a.cmp(b),
        (serde_json::Value::Number(a), serde_json::Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (serde_json::Value::String(a), serde_json::Value::String(b)) => a.cmp(b),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
