//! Editor tools for user interaction.
//!
//! Exactly one tool is active at a time. The active tool turns raw pointer
//! and keyboard input into domain events; only the build tools write to the
//! entity manager directly.

mod delete;
mod eyedropper;
mod floor;
mod manager;
mod move_tool;
mod place;
mod select;
mod tool;
mod view;
mod wall;

pub use delete::{DeleteTool, DELETE_TOOL_ID};
pub use eyedropper::{EyedropperTool, EYEDROPPER_TOOL_ID};
pub use floor::{FloorTool, FLOOR_TOOL_ID};
pub use manager::ToolManager;
pub use move_tool::{MoveTool, MOVE_TOOL_ID};
pub use place::{ItemSlot, PlaceTool, PlacementItem, PLACE_TOOL_ID};
pub use select::{SelectTool, SELECT_TOOL_ID};
pub use tool::{
    EditorMode, Key, KeyEvent, Modifiers, PointerButton, PointerEvent, ToolError, ToolId,
    ToolInput, ToolResult, ToolStrategy,
};
pub use view::{ViewTool, VIEW_TOOL_ID};
pub use wall::{WallTool, WALL_TOOL_ID};
