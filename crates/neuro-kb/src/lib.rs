//! Neuro knowledge graph core: data model, graph store interface and the
//! ontology engine that defines and enforces the schema stored in the graph.

// Core modules
pub mod config;
pub mod data;
pub mod traits;
pub mod ontology;
pub mod accessors;

// Concrete graph store implementations
pub mod adapters;

// Testing utilities
pub mod test_utils;

// Re-export key types for convenient usage
pub use config::{Neo4jConfig, NeuroConfig, OntologyConfig};
pub use data::{Node, NeuroId, OntologyError, PropertyMap, Row, RowExt, StoreError, Value};
pub use traits::GraphStore;
pub use ontology::{
    Direction, InstanceValidator, Lineage, MetapropertyRegistry, OntologyAudit, PropertyKind,
    PropertyRule, PropertyRules, PropertyValidator, RelationshipDeclaration, SchemaTraversal,
    ValidationResult,
};
pub use accessors::NodeAccessor;

#[cfg(feature = "neo4j")]
pub use adapters::Neo4jGraphStore;

/// Initialize tracing for the knowledge graph. Filtering follows `RUST_LOG`.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}
