//! Validation of stored data against the ontology: instance nodes and the
//! ontology's own property classes.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::data::{
    entities::Node,
    errors::OntologyError,
    identifiers::NeuroId,
    types::{PropertyMap, RowExt, Value},
};
use crate::ontology::schema::{Lineage, ONTOLOGY_PROPERTY};
use crate::ontology::traversal::SchemaTraversal;
use crate::ontology::validation::{PropertyValidator, ValidationResult};
use crate::traits::GraphStore;

pub const PROPERTY_CLASSES_QUERY: &str = "MATCH (p:OntologyProperty) \
     RETURN p.label AS label, properties(p) AS properties ORDER BY label";

/// Validates instance nodes against the most specific class among their labels.
#[derive(Clone)]
pub struct InstanceValidator {
    traversal: SchemaTraversal,
    validator: PropertyValidator,
}

impl InstanceValidator {
    pub fn new(traversal: SchemaTraversal, validator: PropertyValidator) -> Self {
        Self { traversal, validator }
    }

    /// Labels naming no class go to `undefined_labels`; labels naming a class
    /// that is duplicated or sits on a cycle go to `broken_classes`. The
    /// resolving class with the longest lineage supplies the rules; without
    /// one, only the labels are reported.
    #[instrument(skip(self, node), fields(node_id = %node.id), err)]
    pub async fn validate(&self, node: &Node) -> Result<ValidationResult, OntologyError> {
        let mut undefined_labels = Vec::new();
        let mut broken_classes = Vec::new();
        let mut effective: Option<Lineage> = None;

        for label in &node.labels {
            match self.traversal.traverse(label).await {
                Ok(lineage) => {
                    if effective.as_ref().map_or(true, |e| lineage.depth() > e.depth()) {
                        effective = Some(lineage);
                    }
                }
                Err(OntologyError::NotFound { .. }) => {
                    debug!("Label {} is not an ontology class", label);
                    undefined_labels.push(label.clone());
                }
                Err(e) if e.is_lookup_failure() => {
                    warn!("Class {} cannot be traversed: {}", label, e);
                    broken_classes.push((label.clone(), e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        let mut result = match &effective {
            Some(lineage) => {
                self.validator
                    .validate(&node.properties, &lineage.properties, lineage.label())
            }
            None => ValidationResult::new(self.validator.is_strict()),
        };
        result.undefined_labels.extend(undefined_labels);
        result.broken_classes.extend(broken_classes);
        Ok(result)
    }

    /// Validates every node, one result per node in input order. A violation
    /// is data; only store failures abort.
    pub async fn validate_all(
        &self,
        nodes: &[Node],
    ) -> Result<Vec<(NeuroId, ValidationResult)>, OntologyError> {
        let mut results = Vec::with_capacity(nodes.len());
        for node in nodes {
            let result = self.validate(node).await?;
            if result.is_violation() {
                warn!("Node {} failed validation:\n{}", node.id, result);
            }
            results.push((node.id, result));
        }
        Ok(results)
    }
}

/// Checks that the ontology's property classes satisfy the schema of the
/// `OntologyProperty` class itself.
#[derive(Clone)]
pub struct OntologyAudit {
    store: Arc<dyn GraphStore>,
    traversal: SchemaTraversal,
    validator: PropertyValidator,
}

impl OntologyAudit {
    pub fn new(
        store: Arc<dyn GraphStore>,
        traversal: SchemaTraversal,
        validator: PropertyValidator,
    ) -> Self {
        Self {
            store,
            traversal,
            validator,
        }
    }

    /// Returns `(label, result)` for every property class that violates the
    /// `OntologyProperty` schema, ordered by label.
    #[instrument(skip(self), err)]
    pub async fn validate_properties(
        &self,
    ) -> Result<Vec<(String, ValidationResult)>, OntologyError> {
        let schema = self.traversal.traverse(ONTOLOGY_PROPERTY).await?;
        let rows = self.store.fetch(PROPERTY_CLASSES_QUERY, PropertyMap::new()).await?;
        info!("Auditing {} property classes", rows.len());

        let mut violations = Vec::new();
        for row in rows {
            let label = row.get_string("label");
            let mut properties = row
                .get("properties")
                .and_then(Value::as_map)
                .cloned()
                .unwrap_or_default();
            properties.remove(NeuroId::PROPERTY);

            let result = self
                .validator
                .validate(&properties, &schema.properties, schema.label());
            if result.is_violation() {
                violations.push((label, result));
            }
        }
        Ok(violations)
    }
}
