//! Command handlers

pub mod ontology;

pub use ontology::{OntologyHandler, Outcome};
