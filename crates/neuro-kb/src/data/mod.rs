//! Core data structures for the Neuro knowledge graph

pub mod types;
pub mod identifiers;
pub mod entities;
pub mod errors;

// Re-export all common types
pub use types::{PropertyMap, Row, RowExt, Value};
pub use identifiers::NeuroId;
pub use entities::Node;
pub use errors::{OntologyError, StoreError};
