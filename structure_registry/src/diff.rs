//! Structure diffing
//!
//! Pure comparison of a declared structure against the live column layout
//! discovered by introspection.

use std::collections::HashMap;

use crate::sql::{normalize_live_type, Dialect};
use crate::types::{DeclaredStructure, StructureDiff};

/// Classify the declared structure against the live one.
///
/// Column names are compared case-insensitively; types are compared after
/// normalization so cosmetic spelling differences (`boolean` vs `tinyint(1)`,
/// `bigint(20)` vs `bigint`) are not reported as drift. Nullability and
/// default values are deliberately not part of drift detection.
pub fn diff_structures(
    declared: &DeclaredStructure,
    live: &HashMap<String, String>,
    dialect: Dialect,
) -> StructureDiff {
    let live: HashMap<String, &str> = live
        .iter()
        .map(|(name, ty)| (name.trim().to_lowercase(), ty.as_str()))
        .collect();

    let mut diff = StructureDiff::default();

    for (name, ty) in declared.iter() {
        match live.get(name) {
            None => diff.add.push((name.to_string(), ty.clone())),
            Some(live_ty) => {
                if normalize_live_type(dialect, live_ty) != ty.affinity(dialect) {
                    diff.modify.push((name.to_string(), ty.clone()));
                }
            }
        }
    }

    for (name, live_ty) in &live {
        if !declared.contains(name) {
            diff.remove.push((name.clone(), live_ty.to_string()));
        }
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnType;

    fn live(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(n, t)| (n.to_string(), t.to_string()))
            .collect()
    }

    #[test]
    fn add_remove_classification() {
        let declared = DeclaredStructure::new()
            .column("a", ColumnType::Int)
            .column("c", ColumnType::Text);
        let diff = diff_structures(
            &declared,
            &live(&[("a", "int(11)"), ("b", "text")]),
            Dialect::MySql,
        );
        assert_eq!(diff.add.len(), 1);
        assert_eq!(diff.add[0].0, "c");
        assert_eq!(diff.remove.len(), 1);
        assert_eq!(diff.remove[0].0, "b");
        assert!(diff.modify.is_empty());
    }

    #[test]
    fn normalization_collapses_type_families() {
        let declared = DeclaredStructure::new().column("a", ColumnType::Bool);
        let diff = diff_structures(&declared, &live(&[("a", "tinyint(1)")]), Dialect::MySql);
        assert!(diff.is_empty());

        let declared = DeclaredStructure::new().column("a", ColumnType::BigInt);
        let diff = diff_structures(&declared, &live(&[("a", "bigint(20)")]), Dialect::MySql);
        assert!(diff.is_empty());
    }

    #[test]
    fn real_type_change_is_reported() {
        let declared = DeclaredStructure::new().column("a", ColumnType::Varchar(200));
        let diff = diff_structures(&declared, &live(&[("a", "varchar(50)")]), Dialect::MySql);
        assert_eq!(diff.modify.len(), 1);
        assert_eq!(diff.modify[0].0, "a");
    }

    #[test]
    fn column_names_compare_case_insensitively() {
        let declared = DeclaredStructure::new().column("Owner_Id", ColumnType::Int);
        let diff = diff_structures(&declared, &live(&[("OWNER_ID", "int(11)")]), Dialect::MySql);
        assert!(diff.is_empty());
    }

    #[test]
    fn empty_diff_against_sqlite_self_creation() {
        let declared = DeclaredStructure::new()
            .column("id", ColumnType::Identity)
            .column("widget", ColumnType::Blob)
            .column("owner_id", ColumnType::Int)
            .column("created_at", ColumnType::Timestamp);
        let diff = diff_structures(
            &declared,
            &live(&[
                ("id", "INTEGER"),
                ("widget", "TEXT"),
                ("owner_id", "INTEGER"),
                ("created_at", "TEXT"),
            ]),
            Dialect::Sqlite,
        );
        assert!(diff.is_empty());
    }
}
