//! Schema vocabulary: graph labels, edge types and the effective-rule records
//! produced by traversal.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Graph label of class nodes.
pub const ONTOLOGY_NODE: &str = "OntologyNode";
/// Graph label of property classes.
pub const ONTOLOGY_PROPERTY: &str = "OntologyProperty";
/// Graph label of relationship classes.
pub const ONTOLOGY_RELATIONSHIP: &str = "OntologyRelationship";

pub const SUBCLASS_OF: &str = "SUBCLASS_OF";
pub const HAS_PROPERTY: &str = "HAS_PROPERTY";
pub const REQUIRE_PROPERTY: &str = "REQUIRE_PROPERTY";
pub const HAS_RELATIONSHIP: &str = "HAS_RELATIONSHIP";
pub const HAS_TARGET: &str = "HAS_TARGET";

/// Whether a property is merely allowed on a class or mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PropertyKind {
    Defined,
    Required,
}

impl PropertyKind {
    /// Maps a property edge type to the kind of rule it declares.
    pub fn from_edge_type(edge_type: &str) -> Option<Self> {
        match edge_type {
            HAS_PROPERTY => Some(PropertyKind::Defined),
            REQUIRE_PROPERTY => Some(PropertyKind::Required),
            _ => None,
        }
    }

    pub fn edge_type(&self) -> &'static str {
        match self {
            PropertyKind::Defined => HAS_PROPERTY,
            PropertyKind::Required => REQUIRE_PROPERTY,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::Defined => "defined",
            PropertyKind::Required => "required",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An effective property rule: its kind, the class that declared it and the
/// optional metaproperty kind of its values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyRule {
    pub kind: PropertyKind,
    pub owner: String,
    pub datatype: Option<String>,
}

impl PropertyRule {
    pub fn new(kind: PropertyKind, owner: impl Into<String>) -> Self {
        Self {
            kind,
            owner: owner.into(),
            datatype: None,
        }
    }

    pub fn required(owner: impl Into<String>) -> Self {
        Self::new(PropertyKind::Required, owner)
    }

    pub fn defined(owner: impl Into<String>) -> Self {
        Self::new(PropertyKind::Defined, owner)
    }

    pub fn with_datatype(mut self, datatype: impl Into<String>) -> Self {
        self.datatype = Some(datatype.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.kind == PropertyKind::Required
    }
}

impl fmt::Display for PropertyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.kind, self.owner)?;
        if let Some(datatype) = &self.datatype {
            write!(f, " ({})", datatype)?;
        }
        Ok(())
    }
}

/// Effective property rules keyed by property label, iterated in label order.
pub type PropertyRules = BTreeMap<String, PropertyRule>;

/// Direction of a relationship declaration relative to the inspected class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Outgoing,
    Incoming,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Outgoing => f.write_str("outgoing"),
            Direction::Incoming => f.write_str("incoming"),
        }
    }
}

/// One `subject -> relationship -> object` declaration seen from a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipDeclaration {
    pub relationship: String,
    pub direction: Direction,
    pub other: String,
    pub declared_by: String,
}

impl fmt::Display for RelationshipDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Outgoing => write!(
                f,
                "{} -[{}]-> {} (declared by {})",
                self.declared_by, self.relationship, self.other, self.declared_by
            ),
            Direction::Incoming => write!(
                f,
                "{} <-[{}]- {} (declared by {})",
                self.declared_by, self.relationship, self.other, self.declared_by
            ),
        }
    }
}

/// Result of walking a class up to its root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lineage {
    /// Queried class first, root last.
    pub lineage: Vec<String>,
    pub properties: PropertyRules,
    pub relationships: Vec<RelationshipDeclaration>,
}

impl Lineage {
    /// The class the traversal started from.
    pub fn label(&self) -> &str {
        self.lineage.first().map(String::as_str).unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.lineage.len()
    }

    pub fn descends_from(&self, ancestor: &str) -> bool {
        self.lineage.iter().any(|l| l == ancestor)
    }
}

/// Human-readable dump used by the `info` statement.
impl fmt::Display for Lineage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ontology info for {}", self.label())?;
        writeln!(f, "{}", "-".repeat(50))?;
        writeln!(f, "Lineage:")?;
        writeln!(f, "    {}", self.lineage.join(" ➜  "))?;
        writeln!(f)?;
        writeln!(f, "Properties:")?;
        if self.properties.is_empty() {
            writeln!(f, "    (none)")?;
        }
        for (label, rule) in &self.properties {
            writeln!(f, "    {}: {}", label, rule)?;
        }
        writeln!(f)?;
        write!(f, "Relationships:")?;
        if self.relationships.is_empty() {
            write!(f, "\n    (none)")?;
        }
        for relationship in &self.relationships {
            write!(f, "\n    {}", relationship)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_property_kind_edge_types() {
        assert_eq!(PropertyKind::from_edge_type("HAS_PROPERTY"), Some(PropertyKind::Defined));
        assert_eq!(PropertyKind::from_edge_type("REQUIRE_PROPERTY"), Some(PropertyKind::Required));
        assert_eq!(PropertyKind::from_edge_type("SUBCLASS_OF"), None);
        assert_eq!(PropertyKind::Required.edge_type(), REQUIRE_PROPERTY);
    }

    #[test]
    fn test_lineage_display() {
        let mut properties = PropertyRules::new();
        properties.insert("rank".into(), PropertyRule::required("Species"));
        properties.insert("created".into(), PropertyRule::defined("Node").with_datatype("DateTime"));
        let lineage = Lineage {
            lineage: vec!["Species".into(), "Node".into()],
            properties,
            relationships: vec![RelationshipDeclaration {
                relationship: "PART_OF".into(),
                direction: Direction::Outgoing,
                other: "Genus".into(),
                declared_by: "Species".into(),
            }],
        };

        let expected = "Ontology info for Species\n\
            --------------------------------------------------\n\
            Lineage:\n    Species ➜  Node\n\n\
            Properties:\n    created: defined by Node (DateTime)\n    rank: required by Species\n\n\
            Relationships:\n    Species -[PART_OF]-> Genus (declared by Species)";
        assert_eq!(lineage.to_string(), expected);
        assert_eq!(lineage.label(), "Species");
        assert!(lineage.descends_from("Node"));
    }
}
