//! A session: parses source text and dispatches each statement in turn,
//! reporting results through a channel.

use std::fmt;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error};

use crate::error::NqlError;
use crate::handlers::{OntologyHandler, Outcome};
use crate::parser::parse_script;
use crate::transformer::transform;

/// What a session reports back for each statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionMessage {
    Outcome(Outcome),
    /// A problem with the input: a syntax error or an unsupported statement.
    Rejected { code: &'static str, message: String },
}

impl fmt::Display for SessionMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMessage::Outcome(outcome) => write!(f, "{}", outcome),
            SessionMessage::Rejected { message, .. } => f.write_str(message),
        }
    }
}

pub struct Session {
    handler: OntologyHandler,
    messages: UnboundedSender<SessionMessage>,
}

impl Session {
    pub fn new(handler: OntologyHandler, messages: UnboundedSender<SessionMessage>) -> Self {
        Self { handler, messages }
    }

    /// Parses `source` and dispatches its statements in order.
    ///
    /// A syntax error rejects the whole source before anything runs; an
    /// unsupported statement is reported and skipped. A store failure stops
    /// the remaining statements and is returned.
    pub async fn parse_and_dispatch(&self, source: &str) -> Result<(), NqlError> {
        let script = match parse_script(source) {
            Ok(script) => script,
            Err(e) => {
                self.reject(&e);
                return Ok(());
            }
        };

        for statement in &script.statements {
            let command = match transform(statement) {
                Ok(command) => command,
                Err(e) => {
                    self.reject(&e);
                    continue;
                }
            };
            match self.handler.dispatch(command).await {
                Ok(outcome) => self.send(SessionMessage::Outcome(outcome)),
                Err(e) if e.is_user_error() => self.reject(&e),
                Err(e) => {
                    error!("Statement '{}' failed: {}", statement, e);
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn reject(&self, e: &NqlError) {
        debug!("Rejected input: {}", e);
        self.send(SessionMessage::Rejected {
            code: e.error_code(),
            message: e.to_string(),
        });
    }

    fn send(&self, message: SessionMessage) {
        if self.messages.send(message).is_err() {
            debug!("Session receiver dropped; discarding message");
        }
    }
}
