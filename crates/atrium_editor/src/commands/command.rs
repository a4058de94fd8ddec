//! Command trait and result types.

use std::panic::{self, AssertUnwindSafe};
use std::time::SystemTime;

use atrium_core::EntityId;
use atrium_ecs::EcsError;
use thiserror::Error;

/// Result type for command execution.
pub type CommandResult = Result<(), CommandError>;

/// Errors that can occur during command execution.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CommandError {
    /// Entity not found
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),
    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    /// Rejected by the entity manager
    #[error(transparent)]
    Ecs(#[from] EcsError),
    /// Generic error
    #[error("Error: {0}")]
    Other(String),
}

/// A reversible mutation.
///
/// `undo` must restore exactly the state observed before `execute`. Returning
/// `Err` from either method leaves the state as it was before the call.
///
/// # Example
///
/// ```ignore
/// struct Rename { entity_id: EntityId, name: String, old: Option<String>, at: SystemTime }
///
/// impl Command for Rename {
///     fn description(&self) -> &str { "Rename" }
///     fn timestamp(&self) -> SystemTime { self.at }
///     fn execute(&mut self) -> CommandResult { /* ... */ Ok(()) }
///     fn undo(&mut self) -> CommandResult { /* ... */ Ok(()) }
/// }
/// ```
pub trait Command: Send + Sync {
    /// Human-readable description for the undo/redo menu.
    fn description(&self) -> &str;

    /// When the command was created.
    fn timestamp(&self) -> SystemTime;

    /// Apply the mutation.
    fn execute(&mut self) -> CommandResult;

    /// Revert the mutation.
    fn undo(&mut self) -> CommandResult;
}

/// Run a command step, turning a panic into [`CommandError::Other`].
pub(crate) fn run_guarded(step: impl FnOnce() -> CommandResult) -> CommandResult {
    match panic::catch_unwind(AssertUnwindSafe(step)) {
        Ok(result) => result,
        Err(cause) => {
            let message = cause
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| cause.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(CommandError::Other(format!("command panicked: {message}")))
        }
    }
}

type Step = Box<dyn FnMut() -> CommandResult + Send + Sync>;

/// Command built from a pair of closures.
pub struct FnCommand {
    description: String,
    timestamp: SystemTime,
    execute: Step,
    undo: Step,
}

impl FnCommand {
    pub fn new<E, U>(description: impl Into<String>, execute: E, undo: U) -> Self
    where
        E: FnMut() -> CommandResult + Send + Sync + 'static,
        U: FnMut() -> CommandResult + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            timestamp: SystemTime::now(),
            execute: Box::new(execute),
            undo: Box::new(undo),
        }
    }
}

impl Command for FnCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    fn execute(&mut self) -> CommandResult {
        (self.execute)()
    }

    fn undo(&mut self) -> CommandResult {
        (self.undo)()
    }
}
