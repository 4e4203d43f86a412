//! Cache key construction
//!
//! Keys are built deterministically from (action, entity kind, optional
//! parameter list) so that any mutation can invalidate every parameterized
//! read derived from the same table by deleting a wildcard prefix.
//!
//! Two invalidation scopes exist per kind: the row scope (`all_records*`),
//! cleared on every row mutation, and the structure scope (`columns*`,
//! `column_names*`, `exists*`), cleared only on create/alter/drop.

/// Deterministic cache key builder for one key-prefix namespace
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    prefix: String,
}

impl KeyBuilder {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Build a cache key: `prefix + action + '_' + kind [+ '_' + params]`.
    /// Empty parameters are filtered out.
    pub fn key(&self, action: &str, kind: &str, params: &[&str]) -> String {
        let mut key = format!("{}{}_{}", self.prefix, action, kind);
        let filtered: Vec<&str> = params.iter().copied().filter(|p| !p.is_empty()).collect();
        if !filtered.is_empty() {
            key.push('_');
            key.push_str(&filtered.join("_"));
        }
        key
    }

    /// Invalidation prefix covering every row-level read for a kind
    pub fn row_scope(&self, kind: &str) -> String {
        format!("{}all_records_{}", self.prefix, kind)
    }

    /// Invalidation prefixes covering every structure-level read for a kind
    pub fn structure_scopes(&self, kind: &str) -> [String; 3] {
        [
            format!("{}columns_{}", self.prefix, kind),
            format!("{}column_names_{}", self.prefix, kind),
            format!("{}exists_{}", self.prefix, kind),
        ]
    }
}
