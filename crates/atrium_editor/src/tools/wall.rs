//! Wall build tool.

use std::sync::Arc;

use atrium_core::{Vec2, Vec3, EPSILON};
use atrium_ecs::{EntityConfig, EntityManager, Render, Transform, Wall};
use atrium_event::EventBus;

use super::{EditorMode, Key, ToolId, ToolInput, ToolResult, ToolStrategy};
use crate::events::{BuildCompleted, BuildKind, BuildResult};

pub const WALL_TOOL_ID: ToolId = ToolId("wall");

/// Click a start point, click an end point. Shift keeps drawing from the end.
pub struct WallTool {
    bus: EventBus,
    manager: Arc<EntityManager>,
    height: f32,
    thickness: f32,
    anchor: Option<Vec2>,
}

impl WallTool {
    pub const DEFAULT_HEIGHT: f32 = 2.5;
    pub const DEFAULT_THICKNESS: f32 = 0.15;

    pub fn new(bus: EventBus, manager: Arc<EntityManager>) -> Self {
        Self {
            bus,
            manager,
            height: Self::DEFAULT_HEIGHT,
            thickness: Self::DEFAULT_THICKNESS,
            anchor: None,
        }
    }

    pub fn with_dimensions(mut self, height: f32, thickness: f32) -> Self {
        self.height = height;
        self.thickness = thickness;
        self
    }

    /// Start point of the wall being drawn
    pub fn anchor(&self) -> Option<Vec2> {
        self.anchor
    }

    fn build(&self, start: Vec2, end: Vec2) -> bool {
        let wall = match Wall::new(start, end, self.height, self.thickness) {
            Ok(wall) => wall,
            Err(err) => {
                log::warn!("Wall rejected: {}", err);
                return false;
            }
        };

        let direction = end - start;
        let mid = wall.midpoint();
        let transform = Transform::new(Vec3::from_xz(mid, 0.0))
            .with_rotation(Vec3::new(0.0, direction.y.atan2(direction.x), 0.0));
        let config = EntityConfig::new()
            .with_component(wall)
            .with_component(transform)
            .with_component(Render::new([0.92, 0.9, 0.86]));

        match self.manager.create_entity(config) {
            Ok(entity) => {
                log::info!("Built wall {} ({:.2} m)", entity.id(), wall.length());
                self.bus.emit::<BuildCompleted>(BuildResult {
                    entity_id: entity.id().clone(),
                    kind: BuildKind::Wall,
                });
                true
            }
            Err(err) => {
                log::warn!("Wall not stored: {}", err);
                false
            }
        }
    }
}

impl ToolStrategy for WallTool {
    fn id(&self) -> ToolId {
        WALL_TOOL_ID
    }

    fn name(&self) -> &str {
        "Wall"
    }

    fn shortcut(&self) -> Option<&str> {
        Some("W")
    }

    fn mode(&self) -> EditorMode {
        EditorMode::Build
    }

    fn deactivate(&mut self) {
        self.anchor = None;
    }

    fn handle_input(&mut self, input: &ToolInput) -> ToolResult {
        match input {
            ToolInput::Click(event) => {
                let point = event.world_position.xz();
                let Some(start) = self.anchor else {
                    self.anchor = Some(point);
                    return ToolResult::Handled;
                };
                if start.distance(point) < EPSILON {
                    return ToolResult::Handled;
                }
                if !self.build(start, point) {
                    return ToolResult::Handled;
                }
                self.anchor = event.modifiers.shift.then_some(point);
                ToolResult::Completed
            }
            ToolInput::KeyDown(key) if key.key == Key::Escape && self.anchor.is_some() => {
                self.anchor = None;
                ToolResult::Handled
            }
            _ => ToolResult::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{KeyEvent, Modifiers, PointerEvent};
    use approx::assert_relative_eq;
    use atrium_ecs::{ComponentType, EntityManagerConfig};
    use parking_lot::Mutex;

    fn setup() -> (WallTool, Arc<EntityManager>, Arc<Mutex<Vec<BuildResult>>>) {
        let bus = EventBus::new();
        let manager = Arc::new(EntityManager::new(EntityManagerConfig::default(), bus.clone()));
        let built = Arc::new(Mutex::new(Vec::new()));
        let b = Arc::clone(&built);
        bus.on::<BuildCompleted, _>(move |r| b.lock().push(r.clone()));
        (WallTool::new(bus, Arc::clone(&manager)), manager, built)
    }

    fn click(x: f32, z: f32, modifiers: Modifiers) -> ToolInput {
        ToolInput::Click(PointerEvent::at(Vec3::new(x, 0.0, z)).with_modifiers(modifiers))
    }

    #[test]
    fn test_two_clicks_build_a_wall() {
        let (mut tool, manager, built) = setup();

        assert_eq!(tool.handle_input(&click(0.0, 0.0, Modifiers::NONE)), ToolResult::Handled);
        assert_eq!(tool.handle_input(&click(4.0, 0.0, Modifiers::NONE)), ToolResult::Completed);
        assert_eq!(tool.anchor(), None);

        let walls = manager.get_entities_with_component(ComponentType::Wall);
        assert_eq!(walls.len(), 1);
        let wall = walls[0].get::<Wall>().unwrap();
        assert_relative_eq!(wall.length(), 4.0);
        assert_eq!(
            walls[0].get::<Transform>().map(|t| t.position),
            Some(Vec3::new(2.0, 0.0, 0.0))
        );
        assert_eq!(built.lock()[0].kind, BuildKind::Wall);
    }

    #[test]
    fn test_shift_chains_walls() {
        let (mut tool, manager, _built) = setup();
        tool.handle_input(&click(0.0, 0.0, Modifiers::NONE));
        tool.handle_input(&click(3.0, 0.0, Modifiers::SHIFT));
        assert_eq!(tool.anchor(), Some(Vec2::new(3.0, 0.0)));
        tool.handle_input(&click(3.0, 3.0, Modifiers::NONE));

        assert_eq!(manager.entity_count(), 2);
    }

    #[test]
    fn test_escape_and_zero_length() {
        let (mut tool, manager, _built) = setup();
        tool.handle_input(&click(1.0, 1.0, Modifiers::NONE));
        tool.handle_input(&click(1.0, 1.0, Modifiers::NONE));
        tool.handle_input(&ToolInput::KeyDown(KeyEvent::new(Key::Escape)));
        tool.handle_input(&click(5.0, 5.0, Modifiers::NONE));

        assert_eq!(manager.entity_count(), 0);
        assert_eq!(tool.anchor(), Some(Vec2::new(5.0, 5.0)));
    }
}
