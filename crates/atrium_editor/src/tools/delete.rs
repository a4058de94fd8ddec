//! Delete tool.

use atrium_event::EventBus;

use super::{EditorMode, Key, ToolId, ToolInput, ToolResult, ToolStrategy};
use crate::events::{DeleteRequest, DeleteRequested};
use crate::selection::SharedSelection;

pub const DELETE_TOOL_ID: ToolId = ToolId("delete");

/// Click an entity, or press Delete for the current selection, to request removal.
pub struct DeleteTool {
    bus: EventBus,
    selection: SharedSelection,
}

impl DeleteTool {
    pub fn new(bus: EventBus, selection: SharedSelection) -> Self {
        Self { bus, selection }
    }
}

impl ToolStrategy for DeleteTool {
    fn id(&self) -> ToolId {
        DELETE_TOOL_ID
    }

    fn name(&self) -> &str {
        "Delete"
    }

    fn shortcut(&self) -> Option<&str> {
        Some("X")
    }

    fn mode(&self) -> EditorMode {
        EditorMode::Delete
    }

    fn handle_input(&mut self, input: &ToolInput) -> ToolResult {
        let entity_ids = match input {
            ToolInput::Click(event) => match &event.entity_id {
                Some(id) => vec![id.clone()],
                None => return ToolResult::None,
            },
            ToolInput::KeyDown(key) if matches!(key.key, Key::Delete | Key::Backspace) => {
                let selected = self.selection.read().selected().to_vec();
                if selected.is_empty() {
                    return ToolResult::None;
                }
                selected
            }
            _ => return ToolResult::None,
        };

        log::debug!("Requesting deletion of {} entities", entity_ids.len());
        self.bus.emit::<DeleteRequested>(DeleteRequest { entity_ids });
        ToolResult::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{SelectionManager, SelectionMode};
    use crate::tools::{KeyEvent, PointerEvent};
    use atrium_core::{EntityId, Vec3};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_click_and_key_requests() {
        let bus = EventBus::new();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let r = Arc::clone(&requests);
        bus.on::<DeleteRequested, _>(move |req| r.lock().push(req.entity_ids.clone()));

        let selection = SelectionManager::shared();
        let mut tool = DeleteTool::new(bus, Arc::clone(&selection));
        let a = EntityId::new("a").unwrap();
        let b = EntityId::new("b").unwrap();

        tool.handle_input(&ToolInput::Click(PointerEvent::at(Vec3::ZERO).with_entity(a.clone())));
        assert_eq!(
            tool.handle_input(&ToolInput::KeyDown(KeyEvent::new(Key::Delete))),
            ToolResult::None
        );

        selection.write().select(a.clone(), SelectionMode::Add);
        selection.write().select(b.clone(), SelectionMode::Add);
        tool.handle_input(&ToolInput::KeyDown(KeyEvent::new(Key::Delete)));

        assert_eq!(*requests.lock(), vec![vec![a.clone()], vec![a, b]]);
    }
}
