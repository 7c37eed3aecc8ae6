//! Schema-mutation and inspection handlers for ontology commands.
//!
//! Every expected negative condition comes back as an [`Outcome`]; only
//! store failures are errors. Probes splice generated NQL property blocks into
//! Cypher; writes always use `MERGE`, so a write racing another session never
//! duplicates nodes or edges.

use chrono::Utc;
use neuro_kb::ontology::schema::{
    HAS_RELATIONSHIP, HAS_TARGET, ONTOLOGY_NODE, ONTOLOGY_RELATIONSHIP, SUBCLASS_OF,
};
use neuro_kb::{
    GraphStore, Lineage, NeuroId, OntologyConfig, OntologyError, PropertyMap, RowExt,
    SchemaTraversal, Value,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::NqlError;
use crate::generator::properties_string;
use crate::transformer::{Command, ConnectionKind, DefinitionKind, NodePattern};

const DEFINE_QUERY: &str = "MERGE (o:{ontology_label} {label: $label}) \
     ON CREATE SET o += $created, o.created = datetime($now), o.modified = datetime($now) \
     ON MATCH SET o += $properties, o.modified = datetime($now)";

const PARENTS_QUERY: &str = "MATCH (s:OntologyNode {label: $label})-[:SUBCLASS_OF]->(p:OntologyNode) \
     RETURN p.label AS label ORDER BY label";

// Re-checked inside the subclass write itself; the earlier checks may be stale.
const NO_CYCLE_GUARD: &str = "NOT (t)-[:SUBCLASS_OF*0..]->(s)";
const NO_PARENT_GUARD: &str = "NOT (s)-[:SUBCLASS_OF]->(:OntologyNode)";

/// Result of a dispatched command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Defined {
        kind: DefinitionKind,
        label: String,
    },
    NothingToAdd,
    Connected {
        subject: String,
        edge: String,
        target: String,
    },
    IncorrectNodes,
    AmbiguousNodes {
        count: usize,
    },
    AlreadySet {
        what: &'static str,
    },
    MultipleParents {
        label: String,
        parent: String,
    },
    WouldCycle {
        subject: String,
        target: String,
    },
    Info(Lineage),
    InfoUnavailable(String),
}

impl Outcome {
    /// Whether the command changed the graph.
    pub fn is_write(&self) -> bool {
        matches!(self, Outcome::Defined { .. } | Outcome::Connected { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Defined { kind, label } => {
                write!(f, "Defined {} '{}'.", kind.ontology_label(), label)
            }
            Outcome::NothingToAdd => f.write_str("Nothing to add."),
            Outcome::Connected {
                subject,
                edge,
                target,
            } => write!(f, "Set {} -[{}]-> {}.", subject, edge, target),
            Outcome::IncorrectNodes => f.write_str("Incorrect ontology nodes given."),
            Outcome::AmbiguousNodes { count } => {
                write!(f, "Ambiguous ontology nodes given ({} matches).", count)
            }
            Outcome::AlreadySet { what } => write!(f, "{} already set.", what),
            Outcome::MultipleParents { label, parent } => {
                write!(f, "{} already has parent class {}.", label, parent)
            }
            Outcome::WouldCycle { subject, target } => write!(
                f,
                "Setting {} as a subclass of {} would create a cycle.",
                subject, target
            ),
            Outcome::Info(lineage) => write!(f, "{}", lineage),
            Outcome::InfoUnavailable(message) => f.write_str(message),
        }
    }
}

/// Routes commands to the schema routines. Holds no state between commands.
#[derive(Clone)]
pub struct OntologyHandler {
    store: Arc<dyn GraphStore>,
    traversal: SchemaTraversal,
    config: OntologyConfig,
}

impl OntologyHandler {
    pub fn new(store: Arc<dyn GraphStore>, config: OntologyConfig) -> Self {
        let traversal = SchemaTraversal::new(store.clone(), config.clone());
        Self {
            store,
            traversal,
            config,
        }
    }

    #[instrument(skip(self, command), err)]
    pub async fn dispatch(&self, command: Command) -> Result<Outcome, NqlError> {
        match command {
            Command::Define { kind, node } => self.define(kind, &node).await,
            Command::Connect {
                kind,
                subject,
                target,
            } => self.connect(kind, &subject, &target).await,
            Command::SetRelationship {
                subject,
                relationship,
                target,
            } => self.set_relationship(&subject, &relationship, &target).await,
            Command::Info { label } => self.info(&label).await,
        }
    }

    async fn define(&self, kind: DefinitionKind, node: &NodePattern) -> Result<Outcome, NqlError> {
        let ontology_label = kind.ontology_label();
        let probe = format!(
            "MATCH (o:{} {}) RETURN o.label AS label",
            ontology_label,
            match_properties(node)
        );
        debug!("Define probe: {}", probe);
        if !self.store.fetch(&probe, PropertyMap::new()).await?.is_empty() {
            return Ok(Outcome::NothingToAdd);
        }

        let mut properties = node.properties.clone();
        properties.remove("label");

        // Generated fields first so user-supplied `neuro.id` and `title` win.
        let mut created: PropertyMap = [
            (NeuroId::PROPERTY, Value::from(NeuroId::new_v4().to_string())),
            ("title", Value::from(format!(".ontology {}", node.label))),
        ]
        .into_iter()
        .collect();
        created.extend(properties.clone());

        let mut params = PropertyMap::new();
        params.insert("label", node.label.as_str());
        params.insert("created", Value::Map(created));
        params.insert("properties", Value::Map(properties));
        params.insert("now", Value::DateTime(Utc::now()));

        let query = DEFINE_QUERY.replace("{ontology_label}", ontology_label);
        self.store.execute(&query, params).await?;
        info!("Defined {} {}", ontology_label, node.label);
        Ok(Outcome::Defined {
            kind,
            label: node.label.clone(),
        })
    }

    async fn connect(
        &self,
        kind: ConnectionKind,
        subject: &NodePattern,
        target: &NodePattern,
    ) -> Result<Outcome, NqlError> {
        let edge = kind.edge_type();
        let endpoints = format!(
            "MATCH (s:{} {}), (t:{} {})",
            ONTOLOGY_NODE,
            match_properties(subject),
            kind.target_label(),
            match_properties(target)
        );
        let probe = format!(
            "{} OPTIONAL MATCH (s)-[e:{}]->(t) \
             RETURN id(s) AS subject_id, id(t) AS target_id, count(e) > 0 AS connected",
            endpoints, edge
        );
        debug!("Connect probe: {}", probe);

        let rows = self.store.fetch(&probe, PropertyMap::new()).await?;
        match rows.len() {
            0 => return Ok(Outcome::IncorrectNodes),
            1 => {}
            count => return Ok(Outcome::AmbiguousNodes { count }),
        }
        if rows[0].get_bool("connected") {
            return Ok(Outcome::AlreadySet {
                what: kind.subject_noun(),
            });
        }

        if kind == ConnectionKind::SetSubclass {
            if let Some(outcome) = self.check_subclass(&subject.label, &target.label).await? {
                return Ok(outcome);
            }
            return self.write_subclass(&endpoints, subject, target).await;
        }

        let write = format!("{} MERGE (s)-[:{}]->(t)", endpoints, edge);
        self.store.execute(&write, PropertyMap::new()).await?;
        info!("Set {} -[{}]-> {}", subject.label, edge, target.label);
        Ok(Outcome::Connected {
            subject: subject.label.clone(),
            edge: edge.to_string(),
            target: target.label.clone(),
        })
    }

    /// Refuses a second parent under single inheritance, and any edge that
    /// would close a cycle.
    async fn check_subclass(
        &self,
        subject: &str,
        target: &str,
    ) -> Result<Option<Outcome>, NqlError> {
        let would_cycle = Outcome::WouldCycle {
            subject: subject.to_string(),
            target: target.to_string(),
        };
        if subject == target {
            return Ok(Some(would_cycle));
        }

        if self.config.single_inheritance {
            let params: PropertyMap = [("label", subject)].into_iter().collect();
            let parents = self.store.fetch(PARENTS_QUERY, params).await?;
            if let Some(parent) = parents
                .iter()
                .map(|row| row.get_string("label"))
                .find(|parent| parent != target)
            {
                return Ok(Some(Outcome::MultipleParents {
                    label: subject.to_string(),
                    parent,
                }));
            }
        }

        match self.traversal.traverse(target).await {
            Ok(lineage) if lineage.descends_from(subject) => Ok(Some(would_cycle)),
            Ok(_) => Ok(None),
            Err(OntologyError::CycleDetected { .. }) => Ok(Some(would_cycle)),
            Err(e) if e.is_lookup_failure() => {
                warn!("Could not check the lineage of {}: {}", target, e);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes `SUBCLASS_OF` only if the guards still hold at write time. No
    /// returned row means another session changed the hierarchy since the
    /// checks; they are run again to report why.
    async fn write_subclass(
        &self,
        endpoints: &str,
        subject: &NodePattern,
        target: &NodePattern,
    ) -> Result<Outcome, NqlError> {
        let mut guards = vec![NO_CYCLE_GUARD];
        if self.config.single_inheritance {
            guards.push(NO_PARENT_GUARD);
        }
        let write = format!(
            "{} WHERE {} MERGE (s)-[:{}]->(t) RETURN id(s) AS subject_id",
            endpoints,
            guards.join(" AND "),
            SUBCLASS_OF
        );
        debug!("Subclass write: {}", write);

        if self.store.fetch(&write, PropertyMap::new()).await?.is_empty() {
            warn!(
                "Hierarchy of {} changed before {} could be set as its parent",
                subject.label, target.label
            );
            return Ok(self
                .check_subclass(&subject.label, &target.label)
                .await?
                .unwrap_or(Outcome::IncorrectNodes));
        }
        info!("Set {} -[{}]-> {}", subject.label, SUBCLASS_OF, target.label);
        Ok(Outcome::Connected {
            subject: subject.label.clone(),
            edge: SUBCLASS_OF.to_string(),
            target: target.label.clone(),
        })
    }

    async fn set_relationship(
        &self,
        subject: &NodePattern,
        relationship: &NodePattern,
        target: &NodePattern,
    ) -> Result<Outcome, NqlError> {
        let endpoints = format!(
            "MATCH (s:{node} {}), (r:{relationship} {}), (t:{node} {})",
            match_properties(subject),
            match_properties(relationship),
            match_properties(target),
            node = ONTOLOGY_NODE,
            relationship = ONTOLOGY_RELATIONSHIP,
        );
        let probe = format!(
            "{} OPTIONAL MATCH (s)-[h:{}]->(r)-[g:{}]->(t) \
             RETURN id(s) AS subject_id, id(r) AS relationship_id, id(t) AS target_id, \
             count(g) > 0 AS connected",
            endpoints, HAS_RELATIONSHIP, HAS_TARGET
        );
        debug!("Relationship probe: {}", probe);

        let rows = self.store.fetch(&probe, PropertyMap::new()).await?;
        match rows.len() {
            0 => return Ok(Outcome::IncorrectNodes),
            1 => {}
            count => return Ok(Outcome::AmbiguousNodes { count }),
        }
        if rows[0].get_bool("connected") {
            return Ok(Outcome::AlreadySet {
                what: "Relationship",
            });
        }

        let write = format!(
            "{} MERGE (s)-[:{}]->(r) MERGE (r)-[:{}]->(t)",
            endpoints, HAS_RELATIONSHIP, HAS_TARGET
        );
        self.store.execute(&write, PropertyMap::new()).await?;
        info!(
            "Set {} -[{}]-> {}",
            subject.label, relationship.label, target.label
        );
        Ok(Outcome::Connected {
            subject: subject.label.clone(),
            edge: relationship.label.clone(),
            target: target.label.clone(),
        })
    }

    async fn info(&self, label: &str) -> Result<Outcome, NqlError> {
        match self.traversal.traverse(label).await {
            Ok(lineage) => Ok(Outcome::Info(lineage)),
            Err(e) if e.is_lookup_failure() => Ok(Outcome::InfoUnavailable(e.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

/// `{label: "..", ..}` for a pattern: its label first, then its properties.
fn match_properties(node: &NodePattern) -> String {
    properties_string(
        &node
            .properties
            .prefixed_with([("label", node.label.as_str())]),
    )
}
