//! Domain error types

use thiserror::Error;

/// Domain-level errors raised while setting up registries.
///
/// Dispatch itself never fails; these only come from register/unregister calls.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("Tool '{0}' is not registered")]
    UnknownTool(String),

    #[error("Invalid tool definition: {0}")]
    InvalidDefinition(String),
}

impl DomainError {
    /// Name of the tool the error refers to, if any
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            DomainError::DuplicateTool(name) | DomainError::UnknownTool(name) => Some(name),
            DomainError::InvalidDefinition(_) => None,
        }
    }
}
