//! Identifier types for the Neuro knowledge graph

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The `neuro.id` of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NeuroId(pub Uuid);

impl fmt::Display for NeuroId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl NeuroId {
    /// Property key under which the id is stored on every node.
    pub const PROPERTY: &'static str = "neuro.id";

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl FromStr for NeuroId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(NeuroId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neuro_id_creation() {
        let id1 = NeuroId::new_v4();
        let id2 = NeuroId::new_v4();
        assert_ne!(id1, id2, "Generated UUIDs should be unique");
    }

    #[test]
    fn test_neuro_id_parse() {
        let id = NeuroId::new_v4();
        let parsed: NeuroId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<NeuroId>().is_err());
    }
}
