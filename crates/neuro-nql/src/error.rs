use neuro_kb::{OntologyError, StoreError};
use thiserror::Error;

/// All possible errors that can occur while processing NQL
#[derive(Error, Debug)]
pub enum NqlError {
    /// Malformed source. `line` and `column` are 1-based.
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    /// Well-formed statement with no handler
    #[error("No handler available for statement '{0}'")]
    UnsupportedStatement(String),

    /// A statement assembled by hand with the wrong number of node references
    #[error("'{keyword}' takes {expected} node references, got {found}")]
    Arity {
        keyword: String,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Ontology(#[from] OntologyError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl NqlError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            NqlError::Syntax { .. } => "ERR_NQL_SYNTAX",
            NqlError::UnsupportedStatement(_) => "ERR_NQL_UNSUPPORTED",
            NqlError::Arity { .. } => "ERR_NQL_ARITY",
            NqlError::Ontology(_) => "ERR_NQL_ONTOLOGY",
            NqlError::Store(_) => "ERR_NQL_STORE",
        }
    }

    /// Whether the error comes from the user's input rather than the store.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            NqlError::Syntax { .. } | NqlError::UnsupportedStatement(_) | NqlError::Arity { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let syntax = NqlError::Syntax {
            message: "unexpected character '1'".into(),
            line: 2,
            column: 12,
        };
        assert_eq!(syntax.error_code(), "ERR_NQL_SYNTAX");
        assert_eq!(
            syntax.to_string(),
            "Syntax error at line 2, column 12: unexpected character '1'"
        );
        assert!(syntax.is_user_error());

        let store: NqlError = StoreError::ConnectionError("down".into()).into();
        assert_eq!(store.error_code(), "ERR_NQL_STORE");
        assert!(!store.is_user_error());
    }

    #[test]
    fn test_unsupported_message() {
        let error = NqlError::UnsupportedStatement("drop".into());
        assert_eq!(error.to_string(), "No handler available for statement 'drop'");
    }
}
