//! Runtime configuration loaded from the environment
//!
//! Precedence is process environment, then `.env`, then `.env.defaults`.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Configuration for Neo4j connection
#[derive(Debug, Clone)]
pub struct Neo4jConfig {
    pub uri: String,
    pub username: String,
    pub password: String,
    pub database: Option<String>,
    pub pool_size: usize,
    pub connection_retry_count: u32,
    pub connection_retry_delay: Duration,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: "neo4j://localhost:7687".to_string(),
            username: "neo4j".to_string(),
            password: String::new(),
            database: None,
            pool_size: 10,
            connection_retry_count: 3,
            connection_retry_delay: Duration::from_secs(2),
        }
    }
}

/// Knobs of the ontology engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologyConfig {
    /// Reject a second `SUBCLASS_OF` parent when defining, and report one as
    /// `MultipleFound` when traversing.
    pub single_inheritance: bool,
    /// Hard cap on lineage length; reaching it is reported as a cycle.
    pub max_lineage_depth: usize,
    /// Whether undefined properties and labels count as violations.
    pub strict_validation: bool,
}

impl Default for OntologyConfig {
    fn default() -> Self {
        Self {
            single_inheritance: true,
            max_lineage_depth: 64,
            strict_validation: true,
        }
    }
}

/// Top-level configuration of a Neuro session.
#[derive(Debug, Clone, Default)]
pub struct NeuroConfig {
    pub neo4j: Neo4jConfig,
    pub ontology: OntologyConfig,
    pub history_path: Option<PathBuf>,
}

impl NeuroConfig {
    /// Loads the dotenv files and reads the configuration from the environment.
    pub fn from_env() -> Self {
        load_env_files();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let neo4j_defaults = Neo4jConfig::default();
        let ontology_defaults = OntologyConfig::default();

        let neo4j = Neo4jConfig {
            uri: lookup("NEO4J_URI").unwrap_or(neo4j_defaults.uri),
            username: lookup("NEO4J_USER").unwrap_or(neo4j_defaults.username),
            password: lookup("NEO4J_PASSWORD").unwrap_or(neo4j_defaults.password),
            database: lookup("NEO4J_DATABASE").filter(|db| !db.is_empty()),
            pool_size: parse_or(&lookup, "NEO4J_POOL_SIZE", neo4j_defaults.pool_size),
            connection_retry_count: parse_or(
                &lookup,
                "NEO4J_CONNECTION_RETRIES",
                neo4j_defaults.connection_retry_count,
            ),
            connection_retry_delay: neo4j_defaults.connection_retry_delay,
        };

        let ontology = OntologyConfig {
            single_inheritance: parse_or(
                &lookup,
                "NEURO_SINGLE_INHERITANCE",
                ontology_defaults.single_inheritance,
            ),
            max_lineage_depth: parse_or(
                &lookup,
                "NEURO_MAX_LINEAGE_DEPTH",
                ontology_defaults.max_lineage_depth,
            ),
            strict_validation: parse_or(
                &lookup,
                "NEURO_STRICT_VALIDATION",
                ontology_defaults.strict_validation,
            ),
        };

        let history_path = lookup("NQL_HISTORY")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".nql_history")));

        Self {
            neo4j,
            ontology,
            history_path,
        }
    }
}

fn load_env_files() {
    // dotenv never overrides a variable that is already set, so loading `.env`
    // before `.env.defaults` gives environment > .env > .env.defaults.
    dotenv::from_filename(".env").ok();
    dotenv::from_filename(".env.defaults").ok();
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring invalid value for {}: {}", key, raw);
                default
            }
        },
        None => default,
    }
}
