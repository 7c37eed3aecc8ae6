//! NQL: the language used to author and inspect the Neuro ontology.
//!
//! Source text flows parser → transformer → handler; the generator goes the
//! other way, turning property maps and parse trees back into NQL text.

pub mod error;
pub mod ast;
pub mod parser;
pub mod transformer;
pub mod generator;
pub mod handlers;
pub mod session;

pub use error::NqlError;
pub use ast::{Identifier, NodeRef, Pair, PropertyBlock, Script, Statement, StatementKind};
pub use parser::{parse_script, parse_statement};
pub use transformer::{transform, Command, ConnectionKind, DefinitionKind, NodePattern};
pub use generator::{node_pattern_string, properties_string, reconstruct};
pub use handlers::{OntologyHandler, Outcome};
pub use session::{Session, SessionMessage};
