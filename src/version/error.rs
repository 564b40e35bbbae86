use thiserror::Error;

/// Malformed version text. Always fatal to the operation that read it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid version {input:?}: {reason}")]
pub struct ParseError {
    pub input: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
