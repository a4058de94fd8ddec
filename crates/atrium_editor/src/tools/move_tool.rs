//! Move tool - drag an entity across the floor.

use atrium_core::{EntityId, Vec3, EPSILON};
use atrium_ecs::{EntityLookup, Transform};
use atrium_event::EventBus;

use super::{EditorMode, Key, ToolId, ToolInput, ToolResult, ToolStrategy};
use crate::events::{MoveRequest, MoveRequested};
use crate::selection::{SelectionMode, SharedSelection};

pub const MOVE_TOOL_ID: ToolId = ToolId("move");

/// Drag state
struct DragState {
    entity_id: EntityId,
    from: Vec3,
    /// Entity position minus the grab point, so the object does not jump
    offset: Vec3,
}

/// Press on an entity, drag, release to request the move.
pub struct MoveTool {
    bus: EventBus,
    lookup: EntityLookup,
    selection: SharedSelection,
    drag: Option<DragState>,
}

impl MoveTool {
    pub fn new(bus: EventBus, lookup: EntityLookup, selection: SharedSelection) -> Self {
        Self {
            bus,
            lookup,
            selection,
            drag: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn target(drag: &DragState, pointer: Vec3) -> Vec3 {
        let to = pointer + drag.offset;
        // Stay on the entity's own level
        Vec3::new(to.x, drag.from.y, to.z)
    }
}

impl ToolStrategy for MoveTool {
    fn id(&self) -> ToolId {
        MOVE_TOOL_ID
    }

    fn name(&self) -> &str {
        "Move"
    }

    fn shortcut(&self) -> Option<&str> {
        Some("M")
    }

    fn mode(&self) -> EditorMode {
        EditorMode::Move
    }

    fn deactivate(&mut self) {
        self.drag = None;
    }

    fn handle_input(&mut self, input: &ToolInput) -> ToolResult {
        match input {
            ToolInput::PointerDown(event) => {
                let Some(id) = &event.entity_id else {
                    return ToolResult::None;
                };
                let Some(from) = (self.lookup)(id).and_then(|e| e.get::<Transform>().map(|t| t.position)) else {
                    log::debug!("Cannot move {}: no transform", id);
                    return ToolResult::None;
                };

                if !self.selection.read().is_selected(id) {
                    let change = self.selection.write().select(id.clone(), SelectionMode::Replace);
                    change.publish(&self.bus);
                }

                self.drag = Some(DragState {
                    entity_id: id.clone(),
                    from,
                    offset: from - event.world_position,
                });
                ToolResult::Handled
            }
            ToolInput::PointerMove(_) if self.drag.is_some() => ToolResult::Handled,
            ToolInput::PointerUp(event) => {
                let Some(drag) = self.drag.take() else {
                    return ToolResult::None;
                };
                let to = Self::target(&drag, event.world_position);
                if to.distance(drag.from) < EPSILON {
                    return ToolResult::Handled;
                }
                self.bus.emit::<MoveRequested>(MoveRequest {
                    entity_id: drag.entity_id,
                    from: drag.from,
                    to,
                });
                ToolResult::Completed
            }
            ToolInput::KeyDown(key) if key.key == Key::Escape && self.drag.is_some() => {
                self.drag = None;
                ToolResult::Handled
            }
            _ => ToolResult::None,
        }
    }
}
