//! Declared structure definitions
//!
//! A declared structure is the desired column layout for one entity kind: an
//! ordered mapping of column name to column type. Column names are sanitized
//! and lowercased at insertion so comparisons with live structures are
//! case-insensitive by construction.

use crate::sql::sanitize_identifier;

/// Column type declarations understood by the statement builders.
///
/// These replace the opaque type-declaration strings of loosely-typed
/// schema maps; `ColumnType::parse` still accepts the string forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// Auto-incrementing identity column
    Identity,
    /// Column holding the fully encoded representation of an object
    Blob,
    Bool,
    Int,
    BigInt,
    Float,
    Varchar(u16),
    Text,
    /// Creation timestamp, defaulted by the engine
    Timestamp,
}

impl ColumnType {
    /// Parse a type declaration string into a column type.
    ///
    /// Accepts the common MySQL-flavored spellings (`boolean`, `tinyint(1)`,
    /// `bigint(20)`, `varchar(100)`, `longtext`, `datetime`, ...). Returns
    /// `None` for declarations outside the supported families.
    pub fn parse(decl: &str) -> Option<ColumnType> {
        let s = decl.trim().to_lowercase();
        if s.is_empty() {
            return None;
        }
        if s.contains("auto_increment") || s == "identity" || s == "serial" {
            return Some(ColumnType::Identity);
        }
        if s == "tinyint(1)" || s.starts_with("bool") {
            return Some(ColumnType::Bool);
        }
        if s.starts_with("bigint") {
            return Some(ColumnType::BigInt);
        }
        if s.starts_with("varchar(") {
            let width = s
                .trim_start_matches("varchar(")
                .split(')')
                .next()
                .and_then(|w| w.parse::<u16>().ok())?;
            return Some(ColumnType::Varchar(width));
        }
        if s == "int" || s.starts_with("int(") || s.starts_with("integer") {
            return Some(ColumnType::Int);
        }
        if s.starts_with("double") || s.starts_with("float") || s == "real" {
            return Some(ColumnType::Float);
        }
        if s == "longtext" || s == "mediumtext" || s == "json" || s == "blob" || s == "longblob" {
            return Some(ColumnType::Blob);
        }
        if s.starts_with("text") || s == "tinytext" {
            return Some(ColumnType::Text);
        }
        if s.starts_with("datetime") || s.starts_with("timestamp") {
            return Some(ColumnType::Timestamp);
        }
        None
    }
}

/// Ordered column layout declared for one entity kind
#[derive(Debug, Clone, Default)]
pub struct DeclaredStructure {
    columns: Vec<(String, ColumnType)>,
}

impl DeclaredStructure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column declaration; replaces any existing declaration
    /// for the same (case-insensitive) name
    pub fn column(mut self, name: &str, ty: ColumnType) -> Self {
        self.set(name, ty);
        self
    }

    pub fn set(&mut self, name: &str, ty: ColumnType) {
        let name = sanitize_identifier(name).to_lowercase();
        if name.is_empty() {
            return;
        }
        if let Some(entry) = self.columns.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = ty;
        } else {
            self.columns.push((name, ty));
        }
    }

    pub fn get(&self, name: &str) -> Option<&ColumnType> {
        let name = name.to_lowercase();
        self.columns
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, ty)| ty)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnType)> {
        self.columns.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Name of the identity column, if one is declared
    pub fn identity_column(&self) -> Option<&str> {
        self.columns
            .iter()
            .find(|(_, t)| *t == ColumnType::Identity)
            .map(|(n, _)| n.as_str())
    }

    /// Name of the first timestamp column, if one is declared
    pub fn timestamp_column(&self) -> Option<&str> {
        self.columns
            .iter()
            .find(|(_, t)| *t == ColumnType::Timestamp)
            .map(|(n, _)| n.as_str())
    }
}

/// Three-way classification of a declared structure against a live one
#[derive(Debug, Clone, Default)]
pub struct StructureDiff {
    /// Declared but absent from the live structure
    pub add: Vec<(String, ColumnType)>,
    /// Present in both, but the normalized types differ
    pub modify: Vec<(String, ColumnType)>,
    /// Live but no longer declared. Computed for observability only;
    /// removal is never acted on (forward-only migration policy).
    pub remove: Vec<(String, String)>,
}

impl StructureDiff {
    /// Whether applying this diff would change the table
    pub fn has_changes(&self) -> bool {
        !self.add.is_empty() || !self.modify.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.modify.is_empty() && self.remove.is_empty()
    }
}
