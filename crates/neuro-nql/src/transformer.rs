//! Normalizes parse trees into typed commands. No I/O and no semantic checks.

use neuro_kb::ontology::schema::{
    HAS_PROPERTY, ONTOLOGY_NODE, ONTOLOGY_PROPERTY, ONTOLOGY_RELATIONSHIP, REQUIRE_PROPERTY,
    SUBCLASS_OF,
};
use neuro_kb::PropertyMap;
use std::fmt;

use crate::ast::{NodeRef, Statement, StatementKind};
use crate::error::NqlError;

/// What a definition statement creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Node,
    Property,
    Relationship,
}

impl DefinitionKind {
    /// Graph label of the defined schema node.
    pub fn ontology_label(&self) -> &'static str {
        match self {
            DefinitionKind::Node => ONTOLOGY_NODE,
            DefinitionKind::Property => ONTOLOGY_PROPERTY,
            DefinitionKind::Relationship => ONTOLOGY_RELATIONSHIP,
        }
    }
}

/// Which edge a binary connection statement sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    RequireProperty,
    SetProperty,
    SetSubclass,
}

impl ConnectionKind {
    pub fn edge_type(&self) -> &'static str {
        match self {
            ConnectionKind::RequireProperty => REQUIRE_PROPERTY,
            ConnectionKind::SetProperty => HAS_PROPERTY,
            ConnectionKind::SetSubclass => SUBCLASS_OF,
        }
    }

    /// Graph label the target must carry. The subject is always a class.
    pub fn target_label(&self) -> &'static str {
        match self {
            ConnectionKind::RequireProperty | ConnectionKind::SetProperty => ONTOLOGY_PROPERTY,
            ConnectionKind::SetSubclass => ONTOLOGY_NODE,
        }
    }

    /// Noun used in user-facing messages.
    pub fn subject_noun(&self) -> &'static str {
        match self {
            ConnectionKind::RequireProperty | ConnectionKind::SetProperty => "Property",
            ConnectionKind::SetSubclass => "Subclass",
        }
    }
}

/// A node reference with its label unquoted and its values unescaped.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePattern {
    pub label: String,
    pub properties: PropertyMap,
}

impl NodePattern {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            properties: PropertyMap::new(),
        }
    }

    pub fn with_properties(mut self, properties: PropertyMap) -> Self {
        self.properties = properties;
        self
    }
}

impl From<&NodeRef> for NodePattern {
    fn from(node: &NodeRef) -> Self {
        Self {
            label: node.label.name.clone(),
            properties: node
                .properties
                .as_ref()
                .map(|block| block.to_property_map())
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for NodePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Define {
        kind: DefinitionKind,
        node: NodePattern,
    },
    Connect {
        kind: ConnectionKind,
        subject: NodePattern,
        target: NodePattern,
    },
    SetRelationship {
        subject: NodePattern,
        relationship: NodePattern,
        target: NodePattern,
    },
    Info {
        label: String,
    },
}

pub fn transform(statement: &Statement) -> Result<Command, NqlError> {
    let nodes: Vec<NodePattern> = statement.nodes.iter().map(NodePattern::from).collect();
    let keyword = statement.kind.keyword();

    let command = match (&statement.kind, nodes.as_slice()) {
        (StatementKind::Other(keyword), _) => {
            return Err(NqlError::UnsupportedStatement(keyword.clone()))
        }
        (StatementKind::Node, [node]) => define(DefinitionKind::Node, node),
        (StatementKind::Property, [node]) => define(DefinitionKind::Property, node),
        (StatementKind::Relationship, [node]) => define(DefinitionKind::Relationship, node),
        (StatementKind::RequireProperty, [subject, target]) => {
            connect(ConnectionKind::RequireProperty, subject, target)
        }
        (StatementKind::SetProperty, [subject, target]) => {
            connect(ConnectionKind::SetProperty, subject, target)
        }
        (StatementKind::SetSubclass, [subject, target]) => {
            connect(ConnectionKind::SetSubclass, subject, target)
        }
        (StatementKind::SetRelationship, [subject, relationship, target]) => {
            Command::SetRelationship {
                subject: subject.clone(),
                relationship: relationship.clone(),
                target: target.clone(),
            }
        }
        (StatementKind::Info, [node]) => Command::Info {
            label: node.label.clone(),
        },
        (kind, found) => {
            return Err(NqlError::Arity {
                keyword: keyword.to_string(),
                expected: kind.arity().unwrap_or_default(),
                found: found.len(),
            })
        }
    };
    Ok(command)
}

fn define(kind: DefinitionKind, node: &NodePattern) -> Command {
    Command::Define {
        kind,
        node: node.clone(),
    }
}

fn connect(kind: ConnectionKind, subject: &NodePattern, target: &NodePattern) -> Command {
    Command::Connect {
        kind,
        subject: subject.clone(),
        target: target.clone(),
    }
}
