//! Read/write access to instance nodes

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::data::{
    entities::Node,
    errors::OntologyError,
    identifiers::NeuroId,
    types::{PropertyMap, RowExt, Value},
};
use crate::traits::GraphStore;

/// Root class every instance class descends from.
pub const NODE_CLASS: &str = "Node";

pub const GET_QUERY: &str = "MATCH (:OntologyNode {label: $root})<-[:SUBCLASS_OF*0..]-(c:OntologyNode) \
     WITH collect(c.label) AS classes \
     MATCH (n {`neuro.id`: $id}) WHERE any(l IN labels(n) WHERE l IN classes) \
     RETURN n.`neuro.id` AS uuid, labels(n) AS labels, properties(n) AS properties";

const NODE_ENTITY: &str = "node";

/// Quotes a graph label for use in Cypher text, doubling embedded backticks.
pub fn escape_label(label: &str) -> String {
    format!("`{}`", label.replace('`', "``"))
}

#[derive(Clone)]
pub struct NodeAccessor {
    store: Arc<dyn GraphStore>,
}

impl NodeAccessor {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Loads the node with `id` whose labels descend from `Node`.
    #[instrument(skip(self), err)]
    pub async fn get(&self, id: &NeuroId) -> Result<Node, OntologyError> {
        let params: PropertyMap = [("root", NODE_CLASS.to_string()), ("id", id.to_string())]
            .into_iter()
            .collect();
        let mut rows = self.store.fetch(GET_QUERY, params).await?;
        match rows.len() {
            0 => Err(OntologyError::not_found(NODE_ENTITY, id.to_string())),
            1 => {
                let row = rows.remove(0);
                Node::from_parts(
                    row.get_opt_string("uuid").as_deref(),
                    row.get_vec_string("labels"),
                    row.get("properties").and_then(Value::as_map),
                )
            }
            n => Err(OntologyError::multiple_found(NODE_ENTITY, id.to_string(), n)),
        }
    }

    /// Merges the node by `neuro.id`, overwriting the given properties and
    /// adding its labels. A title is mandatory.
    #[instrument(skip(self, node), fields(node_id = %node.id), err)]
    pub async fn put(&self, node: &Node) -> Result<(), OntologyError> {
        if node.title().map_or(true, str::is_empty) {
            return Err(OntologyError::InvalidNode(format!(
                "node {} has no title",
                node.id
            )));
        }

        let mut query = "MERGE (o {`neuro.id`: $id}) SET o += $fields".to_string();
        if !node.labels.is_empty() {
            let labels: Vec<String> = node.labels.iter().map(|l| escape_label(l)).collect();
            query.push_str(&format!(" SET o:{}", labels.join(":")));
        }

        let mut params = PropertyMap::new();
        params.insert("id", node.id.to_string());
        params.insert("fields", Value::Map(node.stored_properties()));

        debug!("Writing node: {}", query);
        self.store.execute(&query, params).await?;
        info!("Stored node {}", node.id);
        Ok(())
    }

    /// Counts nodes carrying `label` whose properties include every entry of
    /// `properties`.
    #[instrument(skip(self, properties), err)]
    pub async fn count(&self, label: &str, properties: &PropertyMap) -> Result<u64, OntologyError> {
        let query = format!(
            "MATCH (n:{}) WHERE all(k IN keys($properties) WHERE n[k] = $properties[k]) \
             RETURN count(n) AS count",
            escape_label(label)
        );
        let mut params = PropertyMap::new();
        params.insert("properties", Value::Map(properties.clone()));

        let rows = self.store.fetch(&query, params).await?;
        let count = rows
            .first()
            .and_then(|row| row.get("count"))
            .and_then(Value::as_i64)
            .unwrap_or_default();
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::Row;
    use crate::test_utils::mocks::MockGraphStore;
    use pretty_assertions::assert_eq;

    fn node_row(id: &NeuroId) -> Row {
        let properties: PropertyMap = [("neuro.id", id.to_string()), ("title", "Homo sapiens".into())]
            .into_iter()
            .collect();
        [
            ("uuid".to_string(), Value::from(id.to_string())),
            ("labels".to_string(), Value::List(vec![Value::from("Species")])),
            ("properties".to_string(), Value::Map(properties)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_escape_label() {
        assert_eq!(escape_label("Species"), "`Species`");
        assert_eq!(escape_label("a`b"), "`a``b`");
    }

    #[tokio::test]
    async fn test_get_found() {
        let id = NeuroId::new_v4();
        let mock = MockGraphStore::new();
        mock.returning_rows(vec![node_row(&id)]);

        let accessor = NodeAccessor::new(Arc::new(mock.clone()));
        let node = accessor.get(&id).await.unwrap();
        assert_eq!(node.id, id);
        assert_eq!(node.title(), Some("Homo sapiens"));
        assert_eq!(node.labels, vec!["Species".to_string()]);
        assert_eq!(mock.fetched()[0].1.get("root"), Some(&Value::from("Node")));
    }

    #[tokio::test]
    async fn test_get_missing_and_duplicate() {
        let id = NeuroId::new_v4();
        let mock = MockGraphStore::new();
        mock.returning_rows(vec![])
            .returning_rows(vec![node_row(&id), node_row(&id)]);

        let accessor = NodeAccessor::new(Arc::new(mock));
        assert!(matches!(accessor.get(&id).await, Err(OntologyError::NotFound { .. })));
        assert!(matches!(
            accessor.get(&id).await,
            Err(OntologyError::MultipleFound { count: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_put_requires_title() {
        let mock = MockGraphStore::new();
        let accessor = NodeAccessor::new(Arc::new(mock.clone()));
        let node = Node::new(vec!["Species".into()], PropertyMap::new());

        assert!(matches!(accessor.put(&node).await, Err(OntologyError::InvalidNode(_))));
        assert_eq!(mock.execute_count(), 0);
    }

    #[tokio::test]
    async fn test_put_merges_by_id() {
        let mock = MockGraphStore::new();
        let accessor = NodeAccessor::new(Arc::new(mock.clone()));
        let mut node = Node::new(vec!["Species".into()], PropertyMap::new());
        node.set("title", "Homo sapiens");

        accessor.put(&node).await.unwrap();

        let (query, params) = &mock.executed()[0];
        assert_eq!(
            query,
            "MERGE (o {`neuro.id`: $id}) SET o += $fields SET o:`Species`"
        );
        let fields = params.get("fields").and_then(Value::as_map).unwrap();
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["neuro.id", "title"]);
    }

    #[tokio::test]
    async fn test_count() {
        let mock = MockGraphStore::new();
        let mut row = Row::new();
        row.insert("count".to_string(), Value::Integer(3));
        mock.returning_rows(vec![row]);

        let accessor = NodeAccessor::new(Arc::new(mock));
        let filter: PropertyMap = [("rank", "species")].into_iter().collect();
        assert_eq!(accessor.count("Species", &filter).await.unwrap(), 3);
    }
}
