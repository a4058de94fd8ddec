//! ECS error types

use atrium_core::EntityId;
use thiserror::Error;

/// Errors raised by the entity manager
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EcsError {
    /// No entity with this id
    #[error("Entity not found: {0}")]
    NotFound(EntityId),

    /// An entity with this id already exists
    #[error("Entity already exists: {0}")]
    DuplicateEntity(EntityId),

    /// The configured entity limit was reached
    #[error("Entity capacity exceeded (max {max})")]
    CapacityExceeded { max: usize },

    /// Component rejected by its own validation
    #[error("Invalid component: {0}")]
    InvalidComponent(#[from] ComponentError),
}

/// Errors raised when constructing components
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComponentError {
    /// Arguments would produce a component that cannot exist
    #[error("Invalid {component} state: {reason}")]
    InvalidState {
        component: &'static str,
        reason: String,
    },
}

impl ComponentError {
    pub(crate) fn invalid(component: &'static str, reason: impl Into<String>) -> Self {
        ComponentError::InvalidState {
            component,
            reason: reason.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EcsError>;
