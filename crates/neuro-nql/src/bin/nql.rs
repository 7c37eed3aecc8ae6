//! `nql`: interactive NQL shell against the configured Neo4j database.
//!
//! With a file argument the file is run as one script instead.

use anyhow::{anyhow, Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{error, info, warn};

use neuro_kb::{Neo4jGraphStore, NeuroConfig};
use neuro_nql::{OntologyHandler, Session, SessionMessage};

const PROMPT: &str = "⬤  ";

#[tokio::main]
async fn main() -> Result<()> {
    neuro_kb::init_tracing();

    let config = NeuroConfig::from_env();
    let store = Neo4jGraphStore::new(config.neo4j.clone())
        .await
        .context("failed to connect to Neo4j")?;
    let handler = OntologyHandler::new(Arc::new(store), config.ontology.clone());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let session = Session::new(handler, tx);

    if let Some(path) = std::env::args().nth(1) {
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read script {}", path))?;
        let result = session.parse_and_dispatch(&source).await;
        print_messages(&mut rx);
        return result.map_err(Into::into);
    }

    let mut editor = DefaultEditor::new().map_err(|e| anyhow!("failed to init rustyline: {e}"))?;
    if let Some(path) = &config.history_path {
        if editor.load_history(path).is_err() {
            info!("No history loaded from {}", path.display());
        }
    }

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(anyhow!("readline error: {e}")),
        };
        if line.trim().is_empty() {
            continue;
        }
        if let Err(e) = editor.add_history_entry(line.as_str()) {
            warn!("Failed to record history: {}", e);
        }

        if let Err(e) = session.parse_and_dispatch(&line).await {
            error!("{}", e);
            eprintln!("{}", e);
        }
        print_messages(&mut rx);
    }

    if let Some(path) = &config.history_path {
        if let Err(e) = editor.save_history(path) {
            warn!("Failed to save history to {}: {}", path.display(), e);
        }
    }
    Ok(())
}

fn print_messages(rx: &mut UnboundedReceiver<SessionMessage>) {
    while let Ok(message) = rx.try_recv() {
        match message {
            SessionMessage::Outcome(outcome) => println!("{}", outcome),
            rejected @ SessionMessage::Rejected { .. } => eprintln!("{}", rejected),
        }
    }
}
