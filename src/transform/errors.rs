use thiserror::Error;

use crate::error::EngineError;

/// Errors raised while translating a query to SQL.
#[derive(Debug, Clone, Error)]
pub enum TransformError {
    #[error("Unknown variable '{0}' (not bound by a previous MATCH or WITH)")]
    UnknownVariable(String),
    #[error("Unsupported expression in {context}: {detail}")]
    Unsupported { context: String, detail: String },
    #[error("RETURN clause is empty (must specify at least one expression)")]
    EmptyReturn,
    #[error("Property access on '{0}' requires a node or edge variable")]
    NotAnEntity(String),
    #[error("Invalid variable-length range: minimum hops ({min}) exceeds maximum hops ({max})")]
    InvalidVarlenRange { min: u32, max: u32 },
}

impl TransformError {
    pub fn unsupported(context: &str, detail: impl Into<String>) -> Self {
        TransformError::Unsupported {
            context: context.to_string(),
            detail: detail.into(),
        }
    }
}

impl From<TransformError> for EngineError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::UnknownVariable(name) => EngineError::UnboundVariable(name),
            TransformError::NotAnEntity(name) => {
                EngineError::TypeMismatch(format!("'{}' is not a node or edge variable", name))
            }
            other => EngineError::UnsupportedQuery(other.to_string()),
        }
    }
}
