use thiserror::Error;

use crate::version::error::ParseError;

/// Metadata, configuration or compatibility matrix failed schema checks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Validation failed for {mock}: {source}")]
    Validation {
        mock: String,
        #[source]
        source: ValidationError,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Circular dependency: {}", cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },

    #[error("{mock} depends on {dependency}, which is not registered")]
    UnresolvedDependency { mock: String, dependency: String },

    #[error("Cannot unload {mock}: still required by {}", dependents.join(", "))]
    UnloadBlocked {
        mock: String,
        dependents: Vec<String>,
    },

    #[error("Mock not registered: {0}")]
    NotRegistered(String),

    #[error("Mock is disabled: {0}")]
    Disabled(String),

    #[error("{mock}@{version} is incompatible with the host environment: {reasons}")]
    Incompatible {
        mock: String,
        version: String,
        reasons: String,
    },
}
