//! Eyedropper tool - sample the appearance of an entity.

use atrium_ecs::{EntityLookup, Render};
use atrium_event::EventBus;

use super::{EditorMode, ToolId, ToolInput, ToolResult, ToolStrategy};
use crate::events::{RenderSample, RenderSampled};

pub const EYEDROPPER_TOOL_ID: ToolId = ToolId("eyedropper");

pub struct EyedropperTool {
    bus: EventBus,
    lookup: EntityLookup,
}

impl EyedropperTool {
    pub fn new(bus: EventBus, lookup: EntityLookup) -> Self {
        Self { bus, lookup }
    }
}

impl ToolStrategy for EyedropperTool {
    fn id(&self) -> ToolId {
        EYEDROPPER_TOOL_ID
    }

    fn name(&self) -> &str {
        "Eyedropper"
    }

    fn shortcut(&self) -> Option<&str> {
        Some("I")
    }

    fn mode(&self) -> EditorMode {
        EditorMode::Sample
    }

    fn handle_input(&mut self, input: &ToolInput) -> ToolResult {
        let ToolInput::Click(event) = input else {
            return ToolResult::None;
        };
        let Some(id) = &event.entity_id else {
            return ToolResult::None;
        };
        let Some(render) = (self.lookup)(id).and_then(|e| e.get::<Render>().cloned()) else {
            return ToolResult::None;
        };

        self.bus.emit::<RenderSampled>(RenderSample {
            entity_id: id.clone(),
            render,
        });
        ToolResult::Completed
    }
}
