//! Accessors for instance data stored in the graph

pub mod nodes;

pub use nodes::NodeAccessor;
