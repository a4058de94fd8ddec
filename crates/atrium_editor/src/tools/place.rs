//! Placement tool for dropping catalog items into the lot.

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use atrium_core::Vec3;
use atrium_ecs::{Footprint, Render};
use atrium_event::EventBus;
use parking_lot::RwLock;

use super::{EditorMode, Key, ToolId, ToolInput, ToolResult, ToolStrategy};
use crate::events::{PlacementRequest, PlacementRequested};

pub const PLACE_TOOL_ID: ToolId = ToolId("place");

/// A catalog object waiting to be placed
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementItem {
    pub name: String,
    pub footprint: Footprint,
    pub render: Render,
}

impl PlacementItem {
    pub fn new(name: impl Into<String>, footprint: Footprint, render: Render) -> Self {
        Self {
            name: name.into(),
            footprint,
            render,
        }
    }
}

/// Item slot shared between the place tool and whoever picks items
pub type ItemSlot = Arc<RwLock<Option<PlacementItem>>>;

/// Click to request placement of the pending item; `R` rotates it.
pub struct PlaceTool {
    bus: EventBus,
    item: ItemSlot,
    /// Rotation of the pending placement in 90 degree steps, 0..4
    quarter_turns: u8,
    preview: Option<Vec3>,
}

impl PlaceTool {
    pub fn new(bus: EventBus, item: ItemSlot) -> Self {
        Self {
            bus,
            item,
            quarter_turns: 0,
            preview: None,
        }
    }

    pub fn yaw(&self) -> f32 {
        f32::from(self.quarter_turns) * FRAC_PI_2
    }

    /// Last pointer position, for the renderer's ghost preview
    pub fn preview(&self) -> Option<Vec3> {
        self.preview
    }
}

impl ToolStrategy for PlaceTool {
    fn id(&self) -> ToolId {
        PLACE_TOOL_ID
    }

    fn name(&self) -> &str {
        "Place"
    }

    fn shortcut(&self) -> Option<&str> {
        Some("P")
    }

    fn mode(&self) -> EditorMode {
        EditorMode::Place
    }

    fn deactivate(&mut self) {
        self.preview = None;
    }

    fn handle_input(&mut self, input: &ToolInput) -> ToolResult {
        match input {
            ToolInput::PointerMove(event) => {
                self.preview = Some(event.world_position);
                ToolResult::None
            }
            ToolInput::Click(event) => {
                let Some(item) = self.item.read().clone() else {
                    log::debug!("Place click ignored: no item chosen");
                    return ToolResult::None;
                };
                log::debug!("Requesting placement of '{}' at {:?}", item.name, event.world_position);
                self.bus.emit::<PlacementRequested>(PlacementRequest {
                    item,
                    position: event.world_position,
                    rotation: Vec3::new(0.0, self.yaw(), 0.0),
                });
                ToolResult::Completed
            }
            ToolInput::KeyDown(key) if key.is_char('r') => {
                self.quarter_turns = (self.quarter_turns + 1) % 4;
                ToolResult::Handled
            }
            ToolInput::KeyDown(key) if key.key == Key::Escape => {
                *self.item.write() = None;
                self.preview = None;
                ToolResult::Handled
            }
            _ => ToolResult::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{KeyEvent, PointerEvent};
    use approx::assert_relative_eq;
    use parking_lot::Mutex;

    fn chair() -> PlacementItem {
        PlacementItem::new("chair", Footprint::boxed(1.0, 1.0, 1.0).unwrap(), Render::default())
    }

    #[test]
    fn test_click_requests_placement_with_rotation() {
        let bus = EventBus::new();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let r = Arc::clone(&requests);
        bus.on::<PlacementRequested, _>(move |req| r.lock().push(req.clone()));

        let slot: ItemSlot = Arc::new(RwLock::new(Some(chair())));
        let mut tool = PlaceTool::new(bus, slot);
        tool.handle_input(&ToolInput::KeyDown(KeyEvent::new(Key::Char('R'))));
        let result = tool.handle_input(&ToolInput::Click(PointerEvent::at(Vec3::new(2.0, 0.0, 1.0))));

        assert_eq!(result, ToolResult::Completed);
        let requests = requests.lock();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].item.name, "chair");
        assert_eq!(requests[0].position, Vec3::new(2.0, 0.0, 1.0));
        assert_relative_eq!(requests[0].rotation.y, FRAC_PI_2);
    }

    #[test]
    fn test_rotation_wraps() {
        let mut tool = PlaceTool::new(EventBus::new(), Arc::new(RwLock::new(None)));
        for _ in 0..4 {
            tool.handle_input(&ToolInput::KeyDown(KeyEvent::new(Key::Char('r'))));
        }
        assert_eq!(tool.yaw(), 0.0);
    }

    #[test]
    fn test_no_item_no_request() {
        let bus = EventBus::new();
        let count = Arc::new(Mutex::new(0));
        let c = Arc::clone(&count);
        bus.on::<PlacementRequested, _>(move |_| *c.lock() += 1);

        let slot: ItemSlot = Arc::new(RwLock::new(Some(chair())));
        let mut tool = PlaceTool::new(bus, Arc::clone(&slot));
        tool.handle_input(&ToolInput::KeyDown(KeyEvent::new(Key::Escape)));
        let result = tool.handle_input(&ToolInput::Click(PointerEvent::at(Vec3::ZERO)));

        assert_eq!(result, ToolResult::None);
        assert!(slot.read().is_none());
        assert_eq!(*count.lock(), 0);
    }
}
