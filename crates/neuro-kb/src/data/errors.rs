//! Error types for the Neuro knowledge graph

use thiserror::Error;

/// Specific error type for the graph store (Graph Database interaction).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Graph database connection error: {0}")]
    ConnectionError(String),
    #[error("Graph query execution error: {0}")]
    QueryError(String),
    #[error("Data mapping error from graph result: {0}")]
    MappingError(String),
}

/// Errors raised by the ontology engine and the node accessor.
#[derive(Error, Debug)]
pub enum OntologyError {
    #[error("No {entity} found with label: {id}")]
    NotFound { entity: String, id: String },

    #[error("Multiple {entity} found with label: {id} ({count} matches)")]
    MultipleFound {
        entity: String,
        id: String,
        count: usize,
    },

    #[error("Cycle detected in class lineage at {label}: {}", .lineage.join(" -> "))]
    CycleDetected { label: String, lineage: Vec<String> },

    #[error("Unsupported property type: {kind} for {property}")]
    UnsupportedType { kind: String, property: String },

    #[error("Invalid node: {0}")]
    InvalidNode(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OntologyError {
    /// Helper to create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        OntologyError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Helper to create a multiple found error
    pub fn multiple_found(entity: impl Into<String>, id: impl Into<String>, count: usize) -> Self {
        OntologyError::MultipleFound {
            entity: entity.into(),
            id: id.into(),
            count,
        }
    }

    /// True for lookup outcomes (`NotFound`, `MultipleFound`, `CycleDetected`)
    /// that describe the stored data rather than a failure of the store.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            OntologyError::NotFound { .. }
                | OntologyError::MultipleFound { .. }
                | OntologyError::CycleDetected { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let error = StoreError::ConnectionError("connection failed".into());
        assert_eq!(format!("{}", error), "Graph database connection error: connection failed");
    }

    #[test]
    fn test_store_error_variants() {
        let errors = [
            StoreError::ConnectionError("a".into()),
            StoreError::QueryError("b".into()),
            StoreError::MappingError("c".into()),
        ];
        for error in &errors {
            let prefix = match error {
                StoreError::ConnectionError(_) => "Graph database connection error",
                StoreError::QueryError(_) => "Graph query execution error",
                StoreError::MappingError(_) => "Data mapping error",
            };
            assert!(error.to_string().starts_with(prefix));
        }
    }

    #[test]
    fn test_not_found_error() {
        let error = OntologyError::not_found("ontology node", "Species");
        assert_eq!(error.to_string(), "No ontology node found with label: Species");
        assert!(error.is_lookup_failure());
    }

    #[test]
    fn test_cycle_display() {
        let error = OntologyError::CycleDetected {
            label: "A".into(),
            lineage: vec!["A".into(), "B".into()],
        };
        assert_eq!(error.to_string(), "Cycle detected in class lineage at A: A -> B");
    }

    #[test]
    fn test_store_error_is_not_lookup_failure() {
        let error: OntologyError = StoreError::QueryError("boom".into()).into();
        assert!(!error.is_lookup_failure());
        assert_eq!(error.to_string(), "Graph query execution error: boom");
    }
}
