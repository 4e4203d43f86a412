//! Statement builders
//!
//! All SQL the layer emits is produced here. Table and column identifiers are
//! sanitized to `[A-Za-z0-9_]` before interpolation; values are always left to
//! bound parameters.

use crate::value::SqlValue;
use structure_registry::{sanitize_identifier, DeclaredStructure, Dialect, StructureDiff};

/// Sort direction for ordered reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// `CREATE TABLE IF NOT EXISTS`, enumerating every declared column in order.
/// The if-not-exists semantic is what makes concurrent first construction of
/// the same kind a race without a loser.
pub fn create_table(dialect: Dialect, table: &str, structure: &DeclaredStructure) -> String {
    let columns: Vec<String> = structure
        .iter()
        .map(|(name, ty)| format!("{} {}", sanitize_identifier(name), ty.sql(dialect)))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        sanitize_identifier(table),
        columns.join(", ")
    )
}

/// Alter statements for the `add`/`modify` entries of a diff.
///
/// MySQL gets a single combined statement with one clause per column. SQLite
/// cannot retype a column and cannot combine clauses, so it gets one
/// `ADD COLUMN` statement per missing column and no statements for `modify`
/// entries (the caller logs those). `remove` entries are never acted on.
pub fn alter_table(dialect: Dialect, table: &str, diff: &StructureDiff) -> Vec<String> {
    let table = sanitize_identifier(table);
    match dialect {
        Dialect::MySql => {
            let mut clauses: Vec<String> = Vec::new();
            for (name, ty) in &diff.add {
                clauses.push(format!("ADD {} {}", sanitize_identifier(name), ty.sql(dialect)));
            }
            for (name, ty) in &diff.modify {
                clauses.push(format!(
                    "MODIFY {} {}",
                    sanitize_identifier(name),
                    ty.sql(dialect)
                ));
            }
            if clauses.is_empty() {
                Vec::new()
            } else {
                vec![format!("ALTER TABLE {} {}", table, clauses.join(", "))]
            }
        }
        Dialect::Sqlite => diff
            .add
            .iter()
            .map(|(name, ty)| {
                // ADD COLUMN rejects non-constant defaults
                let ty_sql = ty
                    .sql(dialect)
                    .replace(" DEFAULT CURRENT_TIMESTAMP", "");
                format!(
                    "ALTER TABLE {} ADD COLUMN {} {}",
                    table,
                    sanitize_identifier(name),
                    ty_sql
                )
            })
            .collect(),
    }
}

pub fn drop_table(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", sanitize_identifier(table))
}

/// Introspection: does the table exist?
pub fn table_exists(dialect: Dialect, table: &str) -> (String, Vec<SqlValue>) {
    let table = sanitize_identifier(table);
    match dialect {
        Dialect::MySql => ("SHOW TABLES LIKE ?".to_string(), vec![SqlValue::Text(table)]),
        Dialect::Sqlite => (
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?".to_string(),
            vec![SqlValue::Text(table)],
        ),
    }
}

/// Introspection: live column name/type pairs
pub fn live_structure(dialect: Dialect, table: &str) -> (String, Vec<SqlValue>) {
    let table = sanitize_identifier(table);
    match dialect {
        Dialect::MySql => (format!("SHOW COLUMNS FROM {}", table), vec![]),
        Dialect::Sqlite => (
            format!("SELECT name, type FROM pragma_table_info('{}')", table),
            vec![],
        ),
    }
}

/// Field names carrying the column name and type in introspection rows
pub fn column_fields(dialect: Dialect) -> (&'static str, &'static str) {
    match dialect {
        Dialect::MySql => ("Field", "Type"),
        Dialect::Sqlite => ("name", "type"),
    }
}

/// Insert with the given columns; an empty column list inserts a row with
/// only defaults and identity
pub fn insert(dialect: Dialect, table: &str, columns: &[String]) -> String {
    let table = sanitize_identifier(table);
    if columns.is_empty() {
        return match dialect {
            Dialect::MySql => format!("INSERT INTO {} () VALUES ()", table),
            Dialect::Sqlite => format!("INSERT INTO {} DEFAULT VALUES", table),
        };
    }
    let names: Vec<String> = columns.iter().map(|c| sanitize_identifier(c)).collect();
    let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        names.join(", "),
        placeholders.join(", ")
    )
}

pub fn update(table: &str, columns: &[String], id_column: &str) -> String {
    let assignments: Vec<String> = columns
        .iter()
        .map(|c| format!("{} = ?", sanitize_identifier(c)))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = ?",
        sanitize_identifier(table),
        assignments.join(", "),
        sanitize_identifier(id_column)
    )
}

pub fn delete(table: &str, id_column: &str) -> String {
    format!(
        "DELETE FROM {} WHERE {} = ?",
        sanitize_identifier(table),
        sanitize_identifier(id_column)
    )
}

pub fn select_by_id(table: &str, id_column: &str) -> String {
    format!(
        "SELECT * FROM {} WHERE {} = ?",
        sanitize_identifier(table),
        sanitize_identifier(id_column)
    )
}

/// Equality select on one column, newest-first when a creation column is
/// available
pub fn select_by_column(
    table: &str,
    column: &str,
    order_column: Option<&str>,
    limit_one: bool,
) -> String {
    let mut sql = format!(
        "SELECT * FROM {} WHERE {} = ?",
        sanitize_identifier(table),
        sanitize_identifier(column)
    );
    if let Some(order) = order_column {
        sql.push_str(&format!(" ORDER BY {} DESC", sanitize_identifier(order)));
    }
    if limit_one {
        sql.push_str(" LIMIT 1");
    }
    sql
}

/// Substring select against the encoded blob column
pub fn select_like(table: &str, column: &str, order_column: Option<&str>) -> String {
    let mut sql = format!(
        "SELECT * FROM {} WHERE {} LIKE ? ESCAPE '\\'",
        sanitize_identifier(table),
        sanitize_identifier(column)
    );
    if let Some(order) = order_column {
        sql.push_str(&format!(" ORDER BY {} DESC", sanitize_identifier(order)));
    }
    sql
}

pub fn select_all(table: &str, order: Option<(&str, SortOrder)>) -> String {
    let mut sql = format!("SELECT * FROM {}", sanitize_identifier(table));
    if let Some((column, direction)) = order {
        sql.push_str(&format!(
            " ORDER BY {} {}",
            sanitize_identifier(column),
            direction.as_sql()
        ));
    }
    sql
}

/// Id-only projection for one column's matches
pub fn select_ids(table: &str, id_column: &str, column: &str, order_column: Option<&str>) -> String {
    let mut sql = format!(
        "SELECT {} FROM {} WHERE {} = ?",
        sanitize_identifier(id_column),
        sanitize_identifier(table),
        sanitize_identifier(column)
    );
    if let Some(order) = order_column {
        sql.push_str(&format!(" ORDER BY {} DESC", sanitize_identifier(order)));
    }
    sql
}

/// Escape `LIKE` metacharacters in a literal needle
pub fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
