use async_trait::async_trait;
use neo4rs::{BoltList, BoltMap, BoltNull, BoltString, BoltType, ConfigBuilder, Graph, Query};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::{
    config::Neo4jConfig,
    data::{
        errors::StoreError,
        types::{PropertyMap, Row, Value},
    },
    traits::GraphStore,
};

/// Neo4j implementation of the `GraphStore` trait
pub struct Neo4jGraphStore {
    pub graph: Arc<Graph>,
    config: Neo4jConfig,
}

impl Neo4jGraphStore {
    /// Returns the configuration used for this store
    pub fn get_config(&self) -> &Neo4jConfig {
        &self.config
    }

    /// Connects with retries, checking each connection with a trivial query.
    pub async fn new(config: Neo4jConfig) -> Result<Self, StoreError> {
        if config.password.is_empty() {
            return Err(StoreError::ConnectionError(
                "NEO4J_PASSWORD is not set".to_string(),
            ));
        }

        let mut config_builder = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.username)
            .password(&config.password)
            .max_connections(config.pool_size);

        if let Some(db) = &config.database {
            config_builder = config_builder.db(db.as_str());
        }

        let neo4j_config = config_builder.build().map_err(|e| {
            StoreError::ConnectionError(format!("Failed to build Neo4j config: {}", e))
        })?;

        let attempts = config.connection_retry_count.max(1);
        let mut last_error = None;
        for attempt in 1..=attempts {
            match Graph::connect(neo4j_config.clone()).await {
                Ok(graph) => {
                    info!("Connected to Neo4j at {} (attempt {})", config.uri, attempt);

                    match graph.run(Query::new("RETURN 1 AS test".to_string())).await {
                        Ok(()) => {
                            return Ok(Self {
                                graph: Arc::new(graph),
                                config,
                            });
                        }
                        Err(e) => {
                            error!("Connection test failed: {}", e);
                            last_error = Some(e.to_string());
                        }
                    }
                }
                Err(e) => {
                    error!("Failed to connect to Neo4j (attempt {}): {}", attempt, e);
                    last_error = Some(e.to_string());
                }
            }
            if attempt < attempts {
                tokio::time::sleep(config.connection_retry_delay).await;
            }
        }

        Err(StoreError::ConnectionError(format!(
            "Failed to connect to Neo4j after {} attempts. Last error: {}",
            attempts,
            last_error.unwrap_or_default()
        )))
    }

    fn build_query(query: &str, params: PropertyMap) -> Query {
        let mut q = Query::new(query.to_string());
        for (key, value) in params {
            q = q.param(&key, to_bolt(value));
        }
        q
    }
}

/// Converts a graph value to its Bolt representation. Datetimes travel as
/// RFC 3339 strings and are wrapped in `datetime()` by the query text.
fn to_bolt(value: Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => b.into(),
        Value::Integer(i) => i.into(),
        Value::Float(x) => x.into(),
        Value::String(s) => s.into(),
        Value::DateTime(_) => value.to_string().into(),
        Value::List(items) => {
            let mut list = BoltList::new();
            for item in items {
                list.push(to_bolt(item));
            }
            BoltType::List(list)
        }
        Value::Map(map) => {
            let mut bolt_map = BoltMap::new();
            for (k, v) in map {
                bolt_map.put(BoltString::from(k.as_str()), to_bolt(v));
            }
            BoltType::Map(bolt_map)
        }
    }
}

fn row_to_map(row: neo4rs::Row) -> Result<Row, StoreError> {
    let columns: HashMap<String, serde_json::Value> = row
        .to()
        .map_err(|e| StoreError::MappingError(format!("Failed to map row: {}", e)))?;
    Ok(columns
        .into_iter()
        .map(|(k, v)| (k, Value::from_json(v)))
        .collect())
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    #[instrument(skip(self, params))]
    async fn execute(&self, query: &str, params: PropertyMap) -> Result<(), StoreError> {
        debug!("Executing write: {}", query);
        self.graph
            .run(Self::build_query(query, params))
            .await
            .map_err(|e| {
                error!("Write failed: {}", e);
                StoreError::QueryError(format!("Failed to execute query: {}", e))
            })
    }

    #[instrument(skip(self, params))]
    async fn fetch(&self, query: &str, params: PropertyMap) -> Result<Vec<Row>, StoreError> {
        debug!("Executing read: {}", query);
        let mut result = self
            .graph
            .execute(Self::build_query(query, params))
            .await
            .map_err(|e| StoreError::QueryError(format!("Failed to execute query: {}", e)))?;

        let mut rows = Vec::new();
        loop {
            match result.next().await {
                Ok(Some(row)) => rows.push(row_to_map(row)?),
                Ok(None) => break,
                Err(e) => {
                    return Err(StoreError::QueryError(format!(
                        "Failed to read result row: {}",
                        e
                    )))
                }
            }
        }
        debug!("Read returned {} rows", rows.len());
        Ok(rows)
    }
}
