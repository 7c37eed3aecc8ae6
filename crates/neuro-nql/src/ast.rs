//! NQL parse tree
//!
//! Every node implements `Display`, producing canonical NQL text that parses
//! back to an equal tree.

use neuro_kb::{PropertyMap, Value};
use std::fmt;

/// True if `s` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_cname(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Escapes `s` for use between double quotes.
pub fn escape_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// A bare CNAME or a backtick-quoted key. `name` holds the unquoted text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub name: String,
    pub escaped: bool,
}

impl Identifier {
    /// Quotes the name only when it is not a valid CNAME.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let escaped = !is_cname(&name);
        Self { name, escaped }
    }

    pub fn escaped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            escaped: true,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.escaped {
            write!(f, "`{}`", self.name.replace('`', "``"))
        } else {
            f.write_str(&self.name)
        }
    }
}

/// `key: "value"`. `value` holds the unescaped text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub key: Identifier,
    pub value: String,
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: \"{}\"", self.key, escape_string(&self.value))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyBlock {
    pub pairs: Vec<Pair>,
}

impl PropertyBlock {
    /// Values in insertion order; a repeated key keeps its first position and
    /// its last value.
    pub fn to_property_map(&self) -> PropertyMap {
        self.pairs
            .iter()
            .map(|pair| (pair.key.name.clone(), Value::String(pair.value.clone())))
            .collect()
    }
}

/// Builds the block for a property map, coercing every value to its string
/// form.
impl From<&PropertyMap> for PropertyBlock {
    fn from(properties: &PropertyMap) -> Self {
        let pairs = properties
            .iter()
            .map(|(key, value)| Pair {
                key: Identifier::new(key),
                value: value.to_string(),
            })
            .collect();
        Self { pairs }
    }
}

impl fmt::Display for PropertyBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, pair) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", pair)?;
        }
        f.write_str("}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    pub label: Identifier,
    pub properties: Option<PropertyBlock>,
}

impl NodeRef {
    pub fn new(label: Identifier) -> Self {
        Self {
            label,
            properties: None,
        }
    }

    pub fn with_properties(mut self, properties: PropertyBlock) -> Self {
        self.properties = Some(properties);
        self
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)?;
        if let Some(properties) = &self.properties {
            write!(f, " {}", properties)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Node,
    Property,
    Relationship,
    RequireProperty,
    SetProperty,
    SetSubclass,
    SetRelationship,
    Info,
    /// Any other keyword; parses, but nothing handles it.
    Other(String),
}

impl StatementKind {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "node" => StatementKind::Node,
            "property" => StatementKind::Property,
            "relationship" => StatementKind::Relationship,
            "require_property" => StatementKind::RequireProperty,
            "set_property" => StatementKind::SetProperty,
            "set_subclass" => StatementKind::SetSubclass,
            "set_relationship" => StatementKind::SetRelationship,
            "info" => StatementKind::Info,
            other => StatementKind::Other(other.to_string()),
        }
    }

    pub fn keyword(&self) -> &str {
        match self {
            StatementKind::Node => "node",
            StatementKind::Property => "property",
            StatementKind::Relationship => "relationship",
            StatementKind::RequireProperty => "require_property",
            StatementKind::SetProperty => "set_property",
            StatementKind::SetSubclass => "set_subclass",
            StatementKind::SetRelationship => "set_relationship",
            StatementKind::Info => "info",
            StatementKind::Other(keyword) => keyword,
        }
    }

    /// Number of node references the statement takes; `None` for unknown
    /// keywords.
    pub fn arity(&self) -> Option<usize> {
        match self {
            StatementKind::Node | StatementKind::Property | StatementKind::Relationship => Some(1),
            StatementKind::Info => Some(1),
            StatementKind::RequireProperty
            | StatementKind::SetProperty
            | StatementKind::SetSubclass => Some(2),
            StatementKind::SetRelationship => Some(3),
            StatementKind::Other(_) => None,
        }
    }

    pub fn allows_properties(&self) -> bool {
        !matches!(self, StatementKind::Info)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub kind: StatementKind,
    pub nodes: Vec<NodeRef>,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.keyword())?;
        for node in &self.nodes {
            write!(f, " {}", node)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    pub statements: Vec<Statement>,
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}
