//! Core traits (interfaces) for the Neuro knowledge graph

pub mod graph_store;

pub use graph_store::GraphStore;
