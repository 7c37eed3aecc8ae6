//! GraphStore trait definition for graph database interaction

use async_trait::async_trait;

use crate::data::{
    errors::StoreError,
    types::{PropertyMap, Row},
};

/// Represents the interface for interacting with the graph database.
/// This abstracts the underlying database technology (e.g., Neo4j).
///
/// Every component that needs the store receives it explicitly, usually as an
/// `Arc<dyn GraphStore>`.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Runs a mutating statement.
    ///
    /// Contract: executes the query with the given parameters and discards any
    /// result. Failures surface as `StoreError` and are never swallowed.
    async fn execute(&self, query: &str, params: PropertyMap) -> Result<(), StoreError>;

    /// Runs a read statement.
    ///
    /// Contract: returns zero or more rows keyed by column alias, in the order
    /// the store produced them. Callers must not rely on ordering unless the
    /// query itself sorts.
    async fn fetch(&self, query: &str, params: PropertyMap) -> Result<Vec<Row>, StoreError>;
}
