//! Mapped entity contract

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A domain type persisted through the object mapper.
///
/// An entity serializes to the blob column in full; the fields named by
/// [`Entity::indexed_fields`] are additionally copied into shadow columns so
/// they can be filtered on in SQL. Identity and creation timestamp live in
/// their own columns and are written back into the object after a read.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Entity kind; keys the table name, cache partition, and blob column
    fn kind() -> &'static str;

    /// Field names mirrored into shadow columns. Fields listed here that
    /// have no declared column are skipped at write time.
    fn indexed_fields() -> &'static [&'static str] {
        &[]
    }

    /// Stored identity, if the object has been persisted
    fn id(&self) -> Option<String>;

    fn set_id(&mut self, id: String);

    fn created_at(&self) -> Option<DateTime<Utc>>;

    fn set_created_at(&mut self, at: DateTime<Utc>);
}
