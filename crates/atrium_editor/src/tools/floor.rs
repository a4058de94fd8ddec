//! Floor build tool.

use std::sync::Arc;

use atrium_core::{Aabb2, Vec2, Vec3};
use atrium_ecs::{EntityConfig, EntityManager, Floor, MeshKind, Render, Transform};
use atrium_event::EventBus;

use super::{EditorMode, Key, ToolId, ToolInput, ToolResult, ToolStrategy};
use crate::events::{BuildCompleted, BuildKind, BuildResult};

pub const FLOOR_TOOL_ID: ToolId = ToolId("floor");

/// Click vertices; Enter or a click on the first vertex closes the outline.
pub struct FloorTool {
    bus: EventBus,
    manager: Arc<EntityManager>,
    /// Clicks this close to the first vertex close the polygon
    close_distance: f32,
    points: Vec<Vec2>,
}

impl FloorTool {
    pub const DEFAULT_CLOSE_DISTANCE: f32 = 0.25;

    pub fn new(bus: EventBus, manager: Arc<EntityManager>) -> Self {
        Self {
            bus,
            manager,
            close_distance: Self::DEFAULT_CLOSE_DISTANCE,
            points: Vec::new(),
        }
    }

    pub fn with_close_distance(mut self, close_distance: f32) -> Self {
        self.close_distance = close_distance;
        self
    }

    /// Vertices placed so far
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    fn close(&mut self) -> ToolResult {
        let floor = match Floor::new(self.points.clone(), 0.0) {
            Ok(floor) => floor,
            Err(err) => {
                log::warn!("Floor outline rejected: {}", err);
                return ToolResult::Handled;
            }
        };

        let center = Aabb2::from_points(&floor.points).map_or(Vec2::ZERO, |b| b.center());
        let config = EntityConfig::new()
            .with_component(Transform::new(Vec3::from_xz(center, floor.elevation)))
            .with_component(Render::new([0.76, 0.7, 0.6]).with_mesh(MeshKind::Plane))
            .with_component(floor);

        match self.manager.create_entity(config) {
            Ok(entity) => {
                log::info!("Built floor {}", entity.id());
                self.points.clear();
                self.bus.emit::<BuildCompleted>(BuildResult {
                    entity_id: entity.id().clone(),
                    kind: BuildKind::Floor,
                });
                ToolResult::Completed
            }
            Err(err) => {
                log::warn!("Floor not stored: {}", err);
                ToolResult::Handled
            }
        }
    }
}

impl ToolStrategy for FloorTool {
    fn id(&self) -> ToolId {
        FLOOR_TOOL_ID
    }

    fn name(&self) -> &str {
        "Floor"
    }

    fn shortcut(&self) -> Option<&str> {
        Some("F")
    }

    fn mode(&self) -> EditorMode {
        EditorMode::Build
    }

    fn deactivate(&mut self) {
        self.points.clear();
    }

    fn handle_input(&mut self, input: &ToolInput) -> ToolResult {
        match input {
            ToolInput::Click(event) => {
                let point = event.world_position.xz();
                let closes = self.points.len() >= 3
                    && self.points[0].distance(point) <= self.close_distance;
                if closes {
                    return self.close();
                }
                self.points.push(point);
                ToolResult::Handled
            }
            ToolInput::KeyDown(key) => match key.key {
                Key::Enter if self.points.len() >= 3 => self.close(),
                Key::Backspace if !self.points.is_empty() => {
                    self.points.pop();
                    ToolResult::Handled
                }
                Key::Escape if !self.points.is_empty() => {
                    self.points.clear();
                    ToolResult::Handled
                }
                _ => ToolResult::None,
            },
            _ => ToolResult::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{KeyEvent, PointerEvent};
    use approx::assert_relative_eq;
    use atrium_ecs::{ComponentType, EntityManagerConfig};

    fn setup() -> (FloorTool, Arc<EntityManager>) {
        let bus = EventBus::new();
        let manager = Arc::new(EntityManager::new(EntityManagerConfig::default(), bus.clone()));
        (FloorTool::new(bus, Arc::clone(&manager)), manager)
    }

    fn click(x: f32, z: f32) -> ToolInput {
        ToolInput::Click(PointerEvent::at(Vec3::new(x, 0.0, z)))
    }

    fn key(key: Key) -> ToolInput {
        ToolInput::KeyDown(KeyEvent::new(key))
    }

    #[test]
    fn test_click_first_vertex_closes() {
        let (mut tool, manager) = setup();
        for (x, z) in [(0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0)] {
            tool.handle_input(&click(x, z));
        }
        assert_eq!(tool.handle_input(&click(0.1, 0.1)), ToolResult::Completed);
        assert!(tool.points().is_empty());

        let floors = manager.get_entities_with_component(ComponentType::Floor);
        assert_eq!(floors.len(), 1);
        assert_relative_eq!(floors[0].get::<Floor>().unwrap().area(), 12.0);
    }

    #[test]
    fn test_enter_needs_three_points() {
        let (mut tool, manager) = setup();
        tool.handle_input(&click(0.0, 0.0));
        tool.handle_input(&click(2.0, 0.0));
        assert_eq!(tool.handle_input(&key(Key::Enter)), ToolResult::None);

        tool.handle_input(&click(2.0, 2.0));
        assert_eq!(tool.handle_input(&key(Key::Enter)), ToolResult::Completed);
        assert_eq!(manager.entity_count(), 1);
    }

    #[test]
    fn test_backspace_and_escape() {
        let (mut tool, manager) = setup();
        tool.handle_input(&click(0.0, 0.0));
        tool.handle_input(&click(1.0, 0.0));
        tool.handle_input(&key(Key::Backspace));
        assert_eq!(tool.points(), &[Vec2::ZERO]);

        tool.handle_input(&key(Key::Escape));
        assert!(tool.points().is_empty());
        assert_eq!(manager.entity_count(), 0);
    }

    #[test]
    fn test_degenerate_outline_kept_for_editing() {
        let (mut tool, manager) = setup();
        for x in [0.0, 1.0, 2.0] {
            tool.handle_input(&click(x, 0.0));
        }
        assert_eq!(tool.handle_input(&key(Key::Enter)), ToolResult::Handled);
        assert_eq!(tool.points().len(), 3);
        assert_eq!(manager.entity_count(), 0);
    }
}
