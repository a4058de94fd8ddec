//! Atrium Floorplan Editor Core
//!
//! Everything between raw input and the entity store of the floorplan
//! editor.
//!
//! ## Features
//!
//! - **Tools**: view, select, place, move, delete, wall, floor and eyedropper
//! - **Undo/Redo**: bounded command history with transactions
//! - **Validation**: ordered validators for lot bounds and collisions
//! - **Spatial Grid**: uniform grid hash used as the collision broad phase
//! - **Multi-Select**: Shift/Ctrl click selection
//! - **TOML Config**: every setting has a default
//!
//! ## Architecture
//!
//! ```text
//! Input → Tool → Request event → Validation → Command → EntityManager → Lifecycle events
//! ```
//!
//! Build tools (wall, floor) write to the entity manager directly; every
//! other mutation goes through the command stack.

pub mod app;
pub mod commands;
pub mod config;
pub mod events;
pub mod selection;
pub mod spatial;
pub mod tools;
pub mod validation;

// Re-export commonly used types
pub use app::Application;
pub use commands::{Command, CommandError, CommandResult, CommandStack, SharedCommandStack};
pub use config::{ConfigError, EditorConfig};
pub use selection::{SelectionManager, SelectionMode, SharedSelection};
pub use spatial::SpatialGrid;
pub use tools::{ToolId, ToolManager, ToolResult, ToolStrategy};
pub use validation::{LotBounds, ValidationContext, ValidationSystem, Validator};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::app::Application;
    pub use crate::commands::*;
    pub use crate::config::EditorConfig;
    pub use crate::events::*;
    pub use crate::selection::{SelectionManager, SelectionMode};
    pub use crate::tools::*;
    pub use crate::validation::*;
}
