//! View tool - camera navigation is handled outside the editor core.

use super::{EditorMode, ToolId, ToolInput, ToolResult, ToolStrategy};

pub const VIEW_TOOL_ID: ToolId = ToolId("view");

/// Passive tool: owns the viewport while nothing is being edited.
#[derive(Debug, Default)]
pub struct ViewTool;

impl ViewTool {
    pub fn new() -> Self {
        Self
    }
}

impl ToolStrategy for ViewTool {
    fn id(&self) -> ToolId {
        VIEW_TOOL_ID
    }

    fn name(&self) -> &str {
        "View"
    }

    fn shortcut(&self) -> Option<&str> {
        Some("V")
    }

    fn mode(&self) -> EditorMode {
        EditorMode::View
    }

    fn handle_input(&mut self, _input: &ToolInput) -> ToolResult {
        ToolResult::None
    }
}
