use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;

use crate::data::{
    errors::StoreError,
    types::{PropertyMap, Row, Value},
};
use crate::traits::GraphStore;

/// Builds a result row from string columns.
pub fn row(columns: &[(&str, &str)]) -> Row {
    columns
        .iter()
        .map(|(k, v)| (k.to_string(), Value::from(*v)))
        .collect()
}

/// Fake implementation of GraphStore for testing.
///
/// Read queries answer with canned rows keyed by query text and parameters;
/// unknown reads return no rows. Writes are recorded and otherwise ignored.
#[derive(Default)]
pub struct FakeGraphStore {
    rows: Mutex<HashMap<String, Vec<Row>>>,
    executed: Mutex<Vec<(String, PropertyMap)>>,
}

impl FakeGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds rows answered for `query` run with exactly `params`. Rows added for
    /// the same key accumulate.
    pub fn add_rows(&self, query: &str, params: PropertyMap, rows: Vec<Row>) {
        self.rows
            .lock()
            .entry(key(query, &params))
            .or_default()
            .extend(rows);
    }

    /// Writes seen so far, oldest first.
    pub fn executed(&self) -> Vec<(String, PropertyMap)> {
        self.executed.lock().clone()
    }

    pub fn execute_count(&self) -> usize {
        self.executed.lock().len()
    }

    /// Clear all data in the store
    pub fn clear(&self) {
        self.rows.lock().clear();
        self.executed.lock().clear();
    }
}

impl fmt::Debug for FakeGraphStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeGraphStore")
            .field("canned_queries", &self.rows.lock().len())
            .field("executed", &self.executed.lock().len())
            .finish()
    }
}

fn key(query: &str, params: &PropertyMap) -> String {
    let params = serde_json::to_string(params).unwrap_or_default();
    format!("{}\u{0}{}", query, params)
}

#[async_trait]
impl GraphStore for FakeGraphStore {
    async fn execute(&self, query: &str, params: PropertyMap) -> Result<(), StoreError> {
        self.executed.lock().push((query.to_string(), params));
        Ok(())
    }

    async fn fetch(&self, query: &str, params: PropertyMap) -> Result<Vec<Row>, StoreError> {
        Ok(self
            .rows
            .lock()
            .get(&key(query, &params))
            .cloned()
            .unwrap_or_default())
    }
}
