//! Structure registry
//!
//! A mapping from entity kind to its declared structure. External
//! collaborators register additional kinds through [`StructureRegistry::declare`]
//! before first synchronization; a kind with no registered structure simply
//! has nothing to synchronize.

use std::collections::HashMap;

use thiserror::Error;
use tracing::warn;

use crate::sql::sanitize_identifier;
use crate::types::{ColumnType, DeclaredStructure};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Structure for kind '{0}' declares no identity column")]
    MissingIdentity(String),

    #[error("Structure for kind '{0}' declares no '{1}' blob column")]
    MissingBlobColumn(String, String),
}

/// Registry of declared structures, keyed by entity kind
#[derive(Debug, Clone, Default)]
pub struct StructureRegistry {
    kinds: HashMap<String, DeclaredStructure>,
}

impl StructureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The name of the kind-named blob column for an entity kind
    pub fn blob_column(kind: &str) -> String {
        sanitize_identifier(kind).to_lowercase()
    }

    /// Register or extend the declared structure for an entity kind.
    ///
    /// A first declaration must carry an identity column and the kind-named
    /// blob column. Re-declaration merges new columns into the existing
    /// structure, but never redefines the identity or blob columns of an
    /// already-registered kind; such attempts are logged and ignored.
    pub fn declare(
        &mut self,
        kind: &str,
        structure: DeclaredStructure,
    ) -> Result<(), RegistryError> {
        let key = sanitize_identifier(kind);
        let blob_column = Self::blob_column(kind);

        match self.kinds.get_mut(&key) {
            None => {
                if structure.identity_column().is_none() {
                    return Err(RegistryError::MissingIdentity(kind.to_string()));
                }
                if structure.get(&blob_column) != Some(&ColumnType::Blob) {
                    return Err(RegistryError::MissingBlobColumn(
                        kind.to_string(),
                        blob_column,
                    ));
                }
                self.kinds.insert(key, structure);
            }
            Some(existing) => {
                let identity = existing.identity_column().map(str::to_string);
                for (name, ty) in structure.iter() {
                    let protected =
                        identity.as_deref() == Some(name) || name == blob_column.as_str();
                    if protected {
                        if existing.get(name) != Some(ty) {
                            warn!(
                                kind = %kind,
                                column = %name,
                                "ignoring attempt to redefine a protected column"
                            );
                        }
                        continue;
                    }
                    existing.set(name, ty.clone());
                }
            }
        }
        Ok(())
    }

    /// Look up the declared structure for an entity kind
    pub fn get_structure(&self, kind: &str) -> Option<&DeclaredStructure> {
        self.kinds.get(&sanitize_identifier(kind))
    }

    /// All registered kinds
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(|k| k.as_str())
    }

    /// Forget a kind's declared structure, returning it if it was registered
    pub fn remove(&mut self, kind: &str) -> Option<DeclaredStructure> {
        self.kinds.remove(&sanitize_identifier(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget_structure() -> DeclaredStructure {
        DeclaredStructure::new()
            .column("id", ColumnType::Identity)
            .column("widget", ColumnType::Blob)
            .column("owner_id", ColumnType::Int)
            .column("created_at", ColumnType::Timestamp)
    }

    #[test]
    fn declare_and_lookup() {
        let mut registry = StructureRegistry::new();
        registry.declare("Widget", widget_structure()).unwrap();
        let s = registry.get_structure("Widget").unwrap();
        assert_eq!(s.len(), 4);
        assert!(registry.get_structure("Unknown").is_none());
    }

    #[test]
    fn first_declaration_requires_identity_and_blob() {
        let mut registry = StructureRegistry::new();
        let no_identity = DeclaredStructure::new().column("widget", ColumnType::Blob);
        assert!(matches!(
            registry.declare("Widget", no_identity),
            Err(RegistryError::MissingIdentity(_))
        ));

        let no_blob = DeclaredStructure::new().column("id", ColumnType::Identity);
        assert!(matches!(
            registry.declare("Widget", no_blob),
            Err(RegistryError::MissingBlobColumn(_, _))
        ));
    }

    #[test]
    fn redeclaration_merges_new_columns() {
        let mut registry = StructureRegistry::new();
        registry.declare("Widget", widget_structure()).unwrap();
        registry
            .declare(
                "Widget",
                DeclaredStructure::new().column("status", ColumnType::Varchar(50)),
            )
            .unwrap();
        let s = registry.get_structure("Widget").unwrap();
        assert_eq!(s.get("status"), Some(&ColumnType::Varchar(50)));
        assert_eq!(s.len(), 5);
    }

    #[test]
    fn protected_columns_cannot_be_redefined() {
        let mut registry = StructureRegistry::new();
        registry.declare("Widget", widget_structure()).unwrap();
        registry
            .declare(
                "Widget",
                DeclaredStructure::new()
                    .column("id", ColumnType::Int)
                    .column("widget", ColumnType::Text),
            )
            .unwrap();
        let s = registry.get_structure("Widget").unwrap();
        assert_eq!(s.get("id"), Some(&ColumnType::Identity));
        assert_eq!(s.get("widget"), Some(&ColumnType::Blob));
    }
}
