use thiserror::Error;

use crate::cypher_parser::ParseError;

/// Engine-level error taxonomy. Every error aborts the query; nothing is
/// recovered locally and the core performs no rollback of its own.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),

    #[error("Unbound variable: {0}")]
    UnboundVariable(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Backend error: {0}")]
    Backend(#[from] rusqlite::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn unsupported(message: impl Into<String>) -> Self {
        EngineError::UnsupportedQuery(message.into())
    }

    pub fn unbound(name: impl Into<String>) -> Self {
        EngineError::UnboundVariable(name.into())
    }
}
