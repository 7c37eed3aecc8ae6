//! The ontology engine: schema vocabulary, traversal and validation

pub mod schema;
pub mod traversal;
pub mod metaproperty;
pub mod validation;
pub mod instance;

pub use schema::{Direction, Lineage, PropertyKind, PropertyRule, PropertyRules, RelationshipDeclaration};
pub use traversal::SchemaTraversal;
pub use metaproperty::MetapropertyRegistry;
pub use validation::{InvalidProperty, InvalidReason, PropertyValidator, ValidationResult};
pub use instance::{InstanceValidator, OntologyAudit};
