//! Command pattern implementation for undo/redo support.
//!
//! Every undoable editor mutation goes through a [`CommandStack`].

mod command;
mod entity_commands;
mod stack;

pub use command::{Command, CommandError, CommandResult, FnCommand};
pub use entity_commands::{
    CreateEntityCommand,
    DeleteEntityCommand,
    MoveEntityCommand,
    RemoveComponentCommand,
    SetComponentCommand,
};
pub use stack::{CommandInfo, CommandStack, SharedCommandStack};
