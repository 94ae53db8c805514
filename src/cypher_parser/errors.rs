use thiserror::Error;

/// A parse failure with a one-based source location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl ParseError {
    /// Build a located error from the original input and the unconsumed
    /// remainder at the failure point.
    pub fn at(full: &str, remaining: &str, message: impl Into<String>) -> Self {
        let offset = full.len().saturating_sub(remaining.len());
        let consumed = &full[..offset];
        let line = consumed.matches('\n').count() as u32 + 1;
        let column = match consumed.rfind('\n') {
            Some(pos) => (offset - pos) as u32,
            None => offset as u32 + 1,
        };
        ParseError {
            line,
            column,
            message: message.into(),
        }
    }
}
