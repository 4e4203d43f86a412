//! Structure registry and column-type mapping for shadowstore
//!
//! This crate holds the declared table structure for each entity kind and the
//! type normalization logic used to compare a declared structure against what
//! actually exists in the backing store.

pub mod diff;
pub mod registry;
pub mod sql;
pub mod types;

// Re-export commonly used items
pub use diff::diff_structures;
pub use registry::{RegistryError, StructureRegistry};
pub use sql::{normalize_live_type, sanitize_identifier, table_name, Dialect};
pub use types::{ColumnType, DeclaredStructure, StructureDiff};
