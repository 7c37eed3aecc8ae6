//! Walks `SUBCLASS_OF` chains and collects the effective rules of a class

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::config::OntologyConfig;
use crate::data::{
    errors::OntologyError,
    types::{PropertyMap, Row, RowExt},
};
use crate::ontology::schema::{
    Direction, Lineage, PropertyKind, PropertyRule, PropertyRules, RelationshipDeclaration,
};
use crate::traits::GraphStore;

pub const CLASS_QUERY: &str = "MATCH (o:OntologyNode {label: $label}) RETURN o.label AS label";

pub const PARENT_QUERY: &str = "MATCH (o:OntologyNode {label: $label})-[:SUBCLASS_OF]->(t:OntologyNode) \
     RETURN t.label AS label ORDER BY label";

pub const PROPERTY_QUERY: &str = "MATCH (o:OntologyNode {label: $label})-[r:HAS_PROPERTY|REQUIRE_PROPERTY]->(p:OntologyProperty) \
     RETURN type(r) AS type, p.label AS property, p.type AS datatype ORDER BY property";

pub const OUTGOING_QUERY: &str = "MATCH (o:OntologyNode {label: $label})-[:HAS_RELATIONSHIP]->(r:OntologyRelationship)-[:HAS_TARGET]->(t:OntologyNode) \
     RETURN r.label AS relationship, t.label AS other ORDER BY relationship, other";

pub const INCOMING_QUERY: &str = "MATCH (s:OntologyNode)-[:HAS_RELATIONSHIP]->(r:OntologyRelationship)-[:HAS_TARGET]->(o:OntologyNode {label: $label}) \
     RETURN r.label AS relationship, s.label AS other ORDER BY relationship, other";

const CLASS_ENTITY: &str = "ontology node";
const PARENT_ENTITY: &str = "parent class";

/// Resolves classes and their inherited rules against the graph.
#[derive(Clone)]
pub struct SchemaTraversal {
    store: Arc<dyn GraphStore>,
    config: OntologyConfig,
}

impl SchemaTraversal {
    pub fn new(store: Arc<dyn GraphStore>, config: OntologyConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &OntologyConfig {
        &self.config
    }

    /// Ensures `label` names exactly one class.
    pub async fn resolve(&self, label: &str) -> Result<(), OntologyError> {
        let rows = self.store.fetch(CLASS_QUERY, label_params(label)).await?;
        match rows.len() {
            0 => Err(OntologyError::not_found(CLASS_ENTITY, label)),
            1 => Ok(()),
            n => Err(OntologyError::multiple_found(CLASS_ENTITY, label, n)),
        }
    }

    /// Walks from `label` to its root, collecting lineage, property rules
    /// (closest declaration wins) and relationship declarations.
    #[instrument(skip(self), err)]
    pub async fn traverse(&self, label: &str) -> Result<Lineage, OntologyError> {
        self.resolve(label).await?;

        let mut lineage = Vec::new();
        let mut visited = HashSet::new();
        let mut properties = PropertyRules::new();
        let mut relationships = Vec::new();
        let mut current = label.to_string();

        loop {
            if visited.contains(&current) || lineage.len() >= self.config.max_lineage_depth {
                lineage.push(current.clone());
                return Err(OntologyError::CycleDetected {
                    label: current,
                    lineage,
                });
            }
            visited.insert(current.clone());
            lineage.push(current.clone());
            debug!("Collecting rules of {}", current);

            for (property, rule) in self.direct_properties(&current).await? {
                properties.entry(property).or_insert(rule);
            }
            relationships.extend(self.direct_relationships(&current).await?);

            match self.parent_of(&current).await? {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Ok(Lineage {
            lineage,
            properties,
            relationships,
        })
    }

    async fn direct_properties(
        &self,
        label: &str,
    ) -> Result<Vec<(String, PropertyRule)>, OntologyError> {
        let rows = self.store.fetch(PROPERTY_QUERY, label_params(label)).await?;
        let mut rules = Vec::with_capacity(rows.len());
        for row in rows {
            let edge_type = row.get_string("type");
            let Some(kind) = PropertyKind::from_edge_type(&edge_type) else {
                warn!("Ignoring unknown property edge {} on {}", edge_type, label);
                continue;
            };
            let mut rule = PropertyRule::new(kind, label);
            rule.datatype = row.get_opt_string("datatype");
            rules.push((clean_label(&row, "property"), rule));
        }
        Ok(rules)
    }

    async fn direct_relationships(
        &self,
        label: &str,
    ) -> Result<Vec<RelationshipDeclaration>, OntologyError> {
        let mut declarations = Vec::new();
        for (query, direction) in [
            (OUTGOING_QUERY, Direction::Outgoing),
            (INCOMING_QUERY, Direction::Incoming),
        ] {
            let rows = self.store.fetch(query, label_params(label)).await?;
            declarations.extend(rows.iter().map(|row| RelationshipDeclaration {
                relationship: clean_label(row, "relationship"),
                direction,
                other: clean_label(row, "other"),
                declared_by: label.to_string(),
            }));
        }
        Ok(declarations)
    }

    async fn parent_of(&self, label: &str) -> Result<Option<String>, OntologyError> {
        let rows = self.store.fetch(PARENT_QUERY, label_params(label)).await?;
        let mut parents: Vec<String> = rows.iter().map(|row| clean_label(row, "label")).collect();
        parents.sort();
        match parents.len() {
            0 => Ok(None),
            1 => Ok(parents.pop()),
            n if self.config.single_inheritance => {
                Err(OntologyError::multiple_found(PARENT_ENTITY, label, n))
            }
            n => {
                warn!(
                    "{} has {} parent classes, following {}",
                    label, n, parents[0]
                );
                Ok(parents.into_iter().next())
            }
        }
    }
}

pub(crate) fn label_params(label: &str) -> PropertyMap {
    [("label", label)].into_iter().collect()
}

fn clean_label(row: &Row, column: &str) -> String {
    row.get_string(column).trim_matches('`').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fakes::{row, FakeGraphStore};
    use pretty_assertions::assert_eq;

    fn class(store: &FakeGraphStore, label: &str, parent: Option<&str>) {
        store.add_rows(CLASS_QUERY, label_params(label), vec![row(&[("label", label)])]);
        if let Some(parent) = parent {
            store.add_rows(PARENT_QUERY, label_params(label), vec![row(&[("label", parent)])]);
        }
    }

    #[tokio::test]
    async fn test_unknown_class() {
        let store = Arc::new(FakeGraphStore::new());
        let traversal = SchemaTraversal::new(store, OntologyConfig::default());
        let err = traversal.traverse("Ghost").await.unwrap_err();
        assert!(matches!(err, OntologyError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_backticks_are_stripped() {
        let store = Arc::new(FakeGraphStore::new());
        class(&store, "Species", None);
        store.add_rows(
            PROPERTY_QUERY,
            label_params("Species"),
            vec![row(&[("type", "REQUIRE_PROPERTY"), ("property", "`rank`")])],
        );

        let traversal = SchemaTraversal::new(store, OntologyConfig::default());
        let lineage = traversal.traverse("Species").await.unwrap();
        assert_eq!(lineage.properties.keys().collect::<Vec<_>>(), vec!["rank"]);
        assert_eq!(lineage.properties["rank"], PropertyRule::required("Species"));
    }

    #[tokio::test]
    async fn test_self_parent_is_a_cycle() {
        let store = Arc::new(FakeGraphStore::new());
        class(&store, "Loop", Some("Loop"));

        let traversal = SchemaTraversal::new(store, OntologyConfig::default());
        match traversal.traverse("Loop").await {
            Err(OntologyError::CycleDetected { label, lineage }) => {
                assert_eq!(label, "Loop");
                assert_eq!(lineage, vec!["Loop", "Loop"]);
            }
            other => panic!("expected a cycle, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_depth_cap() {
        let store = Arc::new(FakeGraphStore::new());
        class(&store, "A", Some("B"));
        class(&store, "B", Some("C"));
        class(&store, "C", None);

        let config = OntologyConfig {
            max_lineage_depth: 2,
            ..OntologyConfig::default()
        };
        let traversal = SchemaTraversal::new(store, config);
        assert!(matches!(
            traversal.traverse("A").await,
            Err(OntologyError::CycleDetected { .. })
        ));
    }
}
