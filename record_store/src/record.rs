//! Raw row representation
//!
//! A [`Record`] is one table row with every column carried as a JSON value.
//! Rows cross the cache in this form, so the type is plain data with no
//! engine handles inside.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::engine::SqlRow;

/// Storage timestamp format, shared with the statement builders
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a storage timestamp, falling back to RFC 3339 for values written by
/// other tooling
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// One row from a kind's table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Record {
    columns: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an engine row. Column names are lowercased so lookups are
    /// stable across engines that report identifiers in different cases.
    pub fn from_row(row: &SqlRow) -> Self {
        let columns = row
            .iter()
            .map(|(name, value)| (name.to_lowercase(), value.to_json()))
            .collect();
        Self { columns }
    }

    pub fn get(&self, column: &str) -> Option<&serde_json::Value> {
        self.columns.get(&column.to_lowercase())
    }

    /// The identity value as a string, however the engine reported it
    pub fn id(&self, id_column: &str) -> Option<String> {
        match self.get(id_column)? {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// A column's value as text, if it is textual
    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(|v| v.as_str())
    }

    /// Parse the creation timestamp column
    pub fn created_at(&self, column: &str) -> Option<DateTime<Utc>> {
        parse_timestamp(self.text(column)?)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SqlValue;
    use serde_json::json;

    #[test]
    fn lookups_are_case_insensitive() {
        let mut row = SqlRow::new();
        row.insert("Field".to_string(), SqlValue::Text("name".to_string()));
        let record = Record::from_row(&row);
        assert_eq!(record.get("field"), Some(&json!("name")));
        assert_eq!(record.get("FIELD"), Some(&json!("name")));
    }

    #[test]
    fn numeric_and_text_ids_both_stringify() {
        let mut row = SqlRow::new();
        row.insert("id".to_string(), SqlValue::Integer(42));
        assert_eq!(Record::from_row(&row).id("id"), Some("42".to_string()));

        row.insert("id".to_string(), SqlValue::Text("42".to_string()));
        assert_eq!(Record::from_row(&row).id("id"), Some("42".to_string()));
    }

    #[test]
    fn created_at_parses_storage_and_rfc3339_formats() {
        let mut row = SqlRow::new();
        row.insert(
            "created_at".to_string(),
            SqlValue::Text("2026-08-01 12:30:00".to_string()),
        );
        let record = Record::from_row(&row);
        let parsed = record.created_at("created_at").unwrap();
        assert_eq!(parsed.format(TIMESTAMP_FORMAT).to_string(), "2026-08-01 12:30:00");

        row.insert(
            "created_at".to_string(),
            SqlValue::Text("2026-08-01T12:30:00Z".to_string()),
        );
        assert_eq!(Record::from_row(&row).created_at("created_at"), Some(parsed));
    }
}
