//! Mock implementations of core interfaces for unit testing
//!
//! `MockGraphStore` answers calls from queues of prepared results, in order,
//! and counts every call so tests can assert how many reads and writes a
//! command issued.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::data::{
    errors::StoreError,
    types::{PropertyMap, Row},
};
use crate::traits::GraphStore;

#[derive(Debug, Clone, Default)]
pub struct MockGraphStore {
    fetch_results: Arc<Mutex<VecDeque<Result<Vec<Row>, StoreError>>>>,
    execute_results: Arc<Mutex<VecDeque<Result<(), StoreError>>>>,
    call_counts: Arc<Mutex<HashMap<&'static str, usize>>>,
    fetched: Arc<Mutex<Vec<(String, PropertyMap)>>>,
    executed: Arc<Mutex<Vec<(String, PropertyMap)>>>,
}

impl MockGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the result of the next unanswered `fetch`. Once the queue is
    /// empty, `fetch` returns no rows.
    pub fn returning(&self, result: impl Into<Result<Vec<Row>, StoreError>>) -> &Self {
        self.fetch_results.lock().push_back(result.into());
        self
    }

    pub fn returning_rows(&self, rows: Vec<Row>) -> &Self {
        self.returning(Ok(rows))
    }

    /// Queues the result of the next unanswered `execute`. Once the queue is
    /// empty, `execute` succeeds.
    pub fn returning_for_execute(&self, result: impl Into<Result<(), StoreError>>) -> &Self {
        self.execute_results.lock().push_back(result.into());
        self
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.call_counts.lock().get(method).copied().unwrap_or_default()
    }

    pub fn fetch_count(&self) -> usize {
        self.call_count("fetch")
    }

    pub fn execute_count(&self) -> usize {
        self.call_count("execute")
    }

    pub fn fetched(&self) -> Vec<(String, PropertyMap)> {
        self.fetched.lock().clone()
    }

    pub fn executed(&self) -> Vec<(String, PropertyMap)> {
        self.executed.lock().clone()
    }

    fn record(&self, method: &'static str) {
        *self.call_counts.lock().entry(method).or_insert(0) += 1;
    }
}

#[async_trait]
impl GraphStore for MockGraphStore {
    async fn execute(&self, query: &str, params: PropertyMap) -> Result<(), StoreError> {
        self.record("execute");
        self.executed.lock().push((query.to_string(), params));
        self.execute_results.lock().pop_front().unwrap_or(Ok(()))
    }

    async fn fetch(&self, query: &str, params: PropertyMap) -> Result<Vec<Row>, StoreError> {
        self.record("fetch");
        self.fetched.lock().push((query.to_string(), params));
        self.fetch_results.lock().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fakes::row;

    #[tokio::test]
    async fn test_queued_results_in_order() {
        let mock = MockGraphStore::new();
        mock.returning_rows(vec![row(&[("label", "A")])])
            .returning(Err(StoreError::QueryError("boom".into())));

        assert_eq!(mock.fetch("q1", PropertyMap::new()).await.unwrap().len(), 1);
        assert!(mock.fetch("q2", PropertyMap::new()).await.is_err());
        assert!(mock.fetch("q3", PropertyMap::new()).await.unwrap().is_empty());
        assert_eq!(mock.fetch_count(), 3);
        assert_eq!(mock.execute_count(), 0);
        assert_eq!(mock.fetched()[1].0, "q2");
    }

    #[tokio::test]
    async fn test_execute_failures() {
        let mock = MockGraphStore::new();
        mock.returning_for_execute(Err(StoreError::ConnectionError("down".into())));

        assert!(mock.execute("MERGE", PropertyMap::new()).await.is_err());
        assert!(mock.execute("MERGE", PropertyMap::new()).await.is_ok());
        assert_eq!(mock.execute_count(), 2);
    }
}
