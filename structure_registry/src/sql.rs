//! SQL dialect handling and type normalization
//!
//! This module renders declared column types into dialect-specific SQL and
//! collapses live (introspected) type strings into canonical family tokens so
//! that cosmetic differences are not reported as drift.

use crate::types::ColumnType;

/// SQL dialect spoken by a storage engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Sqlite,
}

/// Strip an identifier down to `[A-Za-z0-9_]` before it is embedded in a statement
pub fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Derive the physical table name for an entity kind
pub fn table_name(prefix: &str, kind: &str) -> String {
    format!("{}{}", prefix, sanitize_identifier(kind).to_lowercase())
}

impl ColumnType {
    /// Render the type declaration for the given dialect
    pub fn sql(&self, dialect: Dialect) -> String {
        match dialect {
            Dialect::MySql => match self {
                ColumnType::Identity => {
                    "bigint(20) unsigned NOT NULL AUTO_INCREMENT PRIMARY KEY".to_string()
                }
                ColumnType::Blob => "longtext".to_string(),
                ColumnType::Bool => "tinyint(1)".to_string(),
                ColumnType::Int => "int(11)".to_string(),
                ColumnType::BigInt => "bigint(20)".to_string(),
                ColumnType::Float => "double".to_string(),
                ColumnType::Varchar(n) => format!("varchar({})", n),
                ColumnType::Text => "text".to_string(),
                ColumnType::Timestamp => "datetime DEFAULT CURRENT_TIMESTAMP".to_string(),
            },
            Dialect::Sqlite => match self {
                ColumnType::Identity => "INTEGER PRIMARY KEY AUTOINCREMENT".to_string(),
                ColumnType::Bool | ColumnType::Int | ColumnType::BigInt => "INTEGER".to_string(),
                ColumnType::Float => "REAL".to_string(),
                ColumnType::Timestamp => "TEXT DEFAULT CURRENT_TIMESTAMP".to_string(),
                ColumnType::Blob | ColumnType::Varchar(_) | ColumnType::Text => "TEXT".to_string(),
            },
        }
    }

    /// Canonical comparison token for drift detection under the given dialect.
    ///
    /// Two column types with the same affinity are considered equivalent when
    /// the declared structure is compared against the live one.
    pub fn affinity(&self, dialect: Dialect) -> String {
        match dialect {
            Dialect::MySql => match self {
                ColumnType::Identity | ColumnType::BigInt => "bigint".to_string(),
                ColumnType::Blob | ColumnType::Text => "text".to_string(),
                ColumnType::Bool => "bool".to_string(),
                ColumnType::Int => "int".to_string(),
                ColumnType::Float => "float".to_string(),
                ColumnType::Varchar(n) => format!("varchar({})", n),
                ColumnType::Timestamp => "timestamp".to_string(),
            },
            Dialect::Sqlite => match self {
                ColumnType::Identity
                | ColumnType::Bool
                | ColumnType::Int
                | ColumnType::BigInt => "integer".to_string(),
                ColumnType::Float => "real".to_string(),
                _ => "text".to_string(),
            },
        }
    }
}

/// Collapse a live (introspected) type string into its canonical family token.
///
/// Lower-cases, trims, and folds known type families so that e.g. `boolean`
/// and `tinyint(1)` compare equal, as do `bigint(20)` and `bigint`.
pub fn normalize_live_type(dialect: Dialect, raw: &str) -> String {
    let s = raw.trim().to_lowercase();
    match dialect {
        Dialect::MySql => {
            if s == "tinyint(1)" || s.starts_with("bool") {
                "bool".to_string()
            } else if s.starts_with("bigint") {
                "bigint".to_string()
            } else if s.starts_with("varchar(") {
                // Width is significant for varchar
                s.split_whitespace().next().unwrap_or(&s).to_string()
            } else if s.starts_with("int")
                || s.starts_with("integer")
                || s.starts_with("mediumint")
                || s.starts_with("smallint")
                || s.starts_with("tinyint")
            {
                "int".to_string()
            } else if s.starts_with("double")
                || s.starts_with("float")
                || s.starts_with("decimal")
                || s == "real"
            {
                "float".to_string()
            } else if s.starts_with("datetime") || s.starts_with("timestamp") {
                "timestamp".to_string()
            } else if s.ends_with("text") {
                "text".to_string()
            } else {
                s
            }
        }
        Dialect::Sqlite => {
            // SQLite column affinity rules, reduced to the three families we emit
            if s.contains("int") {
                "integer".to_string()
            } else if s.contains("real") || s.contains("floa") || s.contains("doub") {
                "real".to_string()
            } else {
                "text".to_string()
            }
        }
    }
}
