//! Selection tool for picking entities in the viewport.

use atrium_event::EventBus;

use super::{EditorMode, Key, ToolId, ToolInput, ToolResult, ToolStrategy};
use crate::selection::{SelectionMode, SharedSelection};

pub const SELECT_TOOL_ID: ToolId = ToolId("select");

/// Click to select; modifiers pick the selection mode.
pub struct SelectTool {
    bus: EventBus,
    selection: SharedSelection,
}

impl SelectTool {
    pub fn new(bus: EventBus, selection: SharedSelection) -> Self {
        Self { bus, selection }
    }
}

impl ToolStrategy for SelectTool {
    fn id(&self) -> ToolId {
        SELECT_TOOL_ID
    }

    fn name(&self) -> &str {
        "Select"
    }

    fn shortcut(&self) -> Option<&str> {
        Some("S")
    }

    fn mode(&self) -> EditorMode {
        EditorMode::Select
    }

    fn handle_input(&mut self, input: &ToolInput) -> ToolResult {
        let change = match input {
            ToolInput::Click(event) => {
                let mode = SelectionMode::from_modifiers(event.modifiers.shift, event.modifiers.ctrl);
                match (&event.entity_id, mode) {
                    (Some(id), mode) => self.selection.write().select(id.clone(), mode),
                    // Plain click on empty space clears
                    (None, SelectionMode::Replace) => self.selection.write().clear(),
                    (None, _) => return ToolResult::None,
                }
            }
            ToolInput::KeyDown(key) if key.key == Key::Escape => self.selection.write().clear(),
            _ => return ToolResult::None,
        };

        if change.is_empty() {
            return ToolResult::None;
        }
        change.publish(&self.bus);
        ToolResult::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EntityDeselected, EntitySelected, SelectionChanged};
    use crate::selection::SelectionManager;
    use crate::tools::{KeyEvent, Modifiers, PointerEvent};
    use atrium_core::{EntityId, Vec3};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn click_on(id: &str, modifiers: Modifiers) -> ToolInput {
        ToolInput::Click(
            PointerEvent::at(Vec3::ZERO)
                .with_entity(EntityId::new(id).unwrap())
                .with_modifiers(modifiers),
        )
    }

    #[test]
    fn test_click_modes() {
        let bus = EventBus::new();
        let selection = SelectionManager::shared();
        let mut tool = SelectTool::new(bus, Arc::clone(&selection));

        tool.handle_input(&click_on("a", Modifiers::NONE));
        tool.handle_input(&click_on("b", Modifiers::SHIFT));
        assert_eq!(selection.read().count(), 2);

        tool.handle_input(&click_on("a", Modifiers::CTRL));
        assert_eq!(selection.read().selected(), &[EntityId::new("b").unwrap()]);

        // Shift-click on empty space keeps the selection
        let empty_shift = ToolInput::Click(PointerEvent::at(Vec3::ZERO).with_modifiers(Modifiers::SHIFT));
        assert_eq!(tool.handle_input(&empty_shift), ToolResult::None);
        assert_eq!(selection.read().count(), 1);

        tool.handle_input(&ToolInput::Click(PointerEvent::at(Vec3::ZERO)));
        assert!(selection.read().is_empty());
    }

    #[test]
    fn test_events_and_escape() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&log);
        bus.on::<EntitySelected, _>(move |id| l.lock().push(format!("+{id}")));
        let l = Arc::clone(&log);
        bus.on::<EntityDeselected, _>(move |id| l.lock().push(format!("-{id}")));
        let l = Arc::clone(&log);
        bus.on::<SelectionChanged, _>(move |_| l.lock().push("changed".to_string()));

        let mut tool = SelectTool::new(bus, SelectionManager::shared());
        tool.handle_input(&click_on("a", Modifiers::NONE));
        assert_eq!(tool.handle_input(&click_on("a", Modifiers::NONE)), ToolResult::None);
        tool.handle_input(&ToolInput::KeyDown(KeyEvent::new(Key::Escape)));

        assert_eq!(*log.lock(), vec!["+a", "changed", "-a", "changed"]);
    }
}
