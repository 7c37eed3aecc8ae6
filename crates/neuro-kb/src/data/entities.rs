//! Instance node record

use serde::Serialize;

use crate::data::{
    errors::OntologyError,
    identifiers::NeuroId,
    types::{PropertyMap, Value},
};

/// A concrete graph entity: fixed structural fields plus an open property map.
///
/// The `neuro.id` is held in `id` and mirrored into `properties` when the node
/// is written, so `properties` never needs to be consulted for identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: NeuroId,
    pub labels: Vec<String>,
    pub properties: PropertyMap,
}

impl Node {
    pub fn new(labels: Vec<String>, properties: PropertyMap) -> Self {
        Self {
            id: NeuroId::new_v4(),
            labels,
            properties,
        }
    }

    pub fn with_id(id: NeuroId, labels: Vec<String>, properties: PropertyMap) -> Self {
        Self { id, labels, properties }
    }

    /// Builds a node from the `uuid`, `labels` and `properties` columns of a
    /// result row.
    pub fn from_parts(
        uuid: Option<&str>,
        labels: Vec<String>,
        properties: Option<&PropertyMap>,
    ) -> Result<Self, OntologyError> {
        let uuid = uuid.ok_or_else(|| OntologyError::InvalidNode("node has no neuro.id".to_string()))?;
        let id = uuid
            .parse::<NeuroId>()
            .map_err(|e| OntologyError::InvalidNode(format!("invalid neuro.id {}: {}", uuid, e)))?;
        let mut properties = properties.cloned().unwrap_or_default();
        properties.remove(NeuroId::PROPERTY);
        Ok(Self { id, labels, properties })
    }

    pub fn title(&self) -> Option<&str> {
        self.properties.get("title").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        if key == NeuroId::PROPERTY {
            return None;
        }
        self.properties.insert(key, value)
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Properties as written to the store: `neuro.id` first, then the rest.
    pub fn stored_properties(&self) -> PropertyMap {
        self.properties
            .prefixed_with([(NeuroId::PROPERTY, Value::String(self.id.to_string()))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_ignores_structural_key() {
        let mut node = Node::new(vec!["Species".into()], PropertyMap::new());
        assert_eq!(node.set("neuro.id", "x"), None);
        assert!(node.get("neuro.id").is_none());

        node.set("title", "Homo sapiens");
        assert_eq!(node.title(), Some("Homo sapiens"));
    }

    #[test]
    fn test_stored_properties_lead_with_id() {
        let mut node = Node::new(vec!["Species".into()], PropertyMap::new());
        node.set("title", "Homo sapiens");
        let stored = node.stored_properties();
        assert_eq!(stored.keys().collect::<Vec<_>>(), vec!["neuro.id", "title"]);
        assert_eq!(stored.get("neuro.id"), Some(&Value::String(node.id.to_string())));
    }

    #[test]
    fn test_from_parts() {
        let id = NeuroId::new_v4();
        let props: PropertyMap = [("neuro.id", id.to_string()), ("title", "x".to_string())]
            .into_iter()
            .collect();
        let node = Node::from_parts(Some(&id.to_string()), vec!["Node".into()], Some(&props)).unwrap();
        assert_eq!(node.id, id);
        assert!(node.has_label("Node"));
        assert_eq!(node.properties.keys().collect::<Vec<_>>(), vec!["title"]);

        assert!(matches!(
            Node::from_parts(Some("bad"), vec![], None),
            Err(OntologyError::InvalidNode(_))
        ));
    }
}
