//! End-to-end editing through tools, requests and the command stack.

use std::sync::Arc;

use atrium_core::{EntityId, Vec3};
use atrium_ecs::{ComponentType, EntityCreated, Footprint, Render, Transform, Wall};
use atrium_editor::events::{
    CommandExecuted, CommandUndone, DeleteRequest, DeleteRequested, PlacementRejected,
    PlacementRejection, SelectionChanged,
};
use atrium_editor::prelude::*;
use atrium_editor::validation::{COLLISION_PREFIX, OUT_OF_BOUNDS};
use parking_lot::Mutex;

fn small_lot() -> EditorConfig {
    let mut config = EditorConfig::default();
    config.lot = LotBounds::new(10.0, 10.0);
    config
}

fn crate_item() -> PlacementItem {
    PlacementItem::new(
        "crate",
        Footprint::boxed(2.0, 2.0, 1.0).unwrap(),
        Render::new([0.5, 0.4, 0.3]),
    )
}

fn click(x: f32, z: f32) -> ToolInput {
    ToolInput::Click(PointerEvent::at(Vec3::new(x, 0.0, z)))
}

fn placed(app: &Application) -> Vec<EntityId> {
    app.entities()
        .get_entities_with_component(ComponentType::Footprint)
        .iter()
        .map(|e| e.id().clone())
        .collect()
}

fn record_rejections(app: &Application) -> Arc<Mutex<Vec<PlacementRejection>>> {
    let rejections = Arc::new(Mutex::new(Vec::new()));
    let r = Arc::clone(&rejections);
    app.bus()
        .on::<PlacementRejected, _>(move |rejection| r.lock().push(rejection.clone()));
    rejections
}

#[test]
fn test_placement_validates_then_commits() {
    let mut app = Application::new(small_lot()).unwrap();
    let rejections = record_rejections(&app);
    app.tools_mut().activate(PLACE_TOOL_ID).unwrap();
    app.select_item(Some(crate_item()));

    app.handle_input(&click(0.0, 0.0));
    app.handle_input(&click(1.0, 1.0));
    app.handle_input(&click(9.0, 9.0));

    let ids = placed(&app);
    assert_eq!(ids.len(), 1);

    let rejections = rejections.lock();
    assert_eq!(rejections.len(), 2);
    assert_eq!(rejections[0].errors, vec![format!("{}: {}", COLLISION_PREFIX, ids[0])]);
    assert_eq!(rejections[1].errors, vec![OUT_OF_BOUNDS.to_string()]);
    assert_eq!(app.commands().history_size(), 1);
}

#[test]
fn test_undo_redo_placement_keeps_id() {
    let mut app = Application::new(small_lot()).unwrap();
    app.tools_mut().activate(PLACE_TOOL_ID).unwrap();
    app.select_item(Some(crate_item()));
    app.handle_input(&click(0.0, 0.0));
    let id = placed(&app)[0].clone();

    assert!(app.undo());
    assert!(placed(&app).is_empty());
    assert!(app.can_redo());

    assert!(app.redo());
    assert_eq!(placed(&app), vec![id]);
}

#[test]
fn test_rotated_placement_uses_rotated_footprint() {
    let mut app = Application::new(small_lot()).unwrap();
    let rejections = record_rejections(&app);
    app.tools_mut().activate(PLACE_TOOL_ID).unwrap();
    app.select_item(Some(PlacementItem::new(
        "bench",
        Footprint::boxed(4.0, 1.0, 0.5).unwrap(),
        Render::default(),
    )));

    // Unrotated it fits against the far edge
    app.handle_input(&click(0.0, 4.0));
    assert_eq!(placed(&app).len(), 1);

    // A quarter turn makes it 4m deep
    app.handle_input(&ToolInput::KeyDown(KeyEvent::new(Key::Char('R'))));
    app.handle_input(&click(-4.0, -3.5));
    assert_eq!(rejections.lock().len(), 1);
    assert_eq!(rejections.lock()[0].errors, vec![OUT_OF_BOUNDS.to_string()]);

    app.handle_input(&click(-4.0, -2.0));
    let stored = app.entities().get_entities_with_component(ComponentType::Footprint);
    assert_eq!(stored.len(), 2);
    let rotated = stored
        .iter()
        .filter_map(|e| e.get::<Transform>())
        .filter(|t| t.rotation.y > 0.0)
        .count();
    assert_eq!(rotated, 1);
}

#[test]
fn test_move_tool_drag_goes_through_validation() {
    let mut app = Application::new(small_lot()).unwrap();
    let rejections = record_rejections(&app);
    app.tools_mut().activate(PLACE_TOOL_ID).unwrap();
    app.select_item(Some(crate_item()));
    app.handle_input(&click(-2.0, 0.0));
    app.handle_input(&click(2.0, 0.0));
    let ids = placed(&app);

    app.tools_mut().activate(MOVE_TOOL_ID).unwrap();
    let drag = |app: &mut Application, id: &EntityId, from: Vec3, to: Vec3| {
        app.handle_input(&ToolInput::PointerDown(PointerEvent::at(from).with_entity(id.clone())));
        app.handle_input(&ToolInput::PointerMove(PointerEvent::at(to)));
        app.handle_input(&ToolInput::PointerUp(PointerEvent::at(to)));
    };

    // Onto the other crate: rejected, nothing moves
    drag(&mut app, &ids[0], Vec3::new(-2.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(app.position_of(&ids[0]), Some(Vec3::new(-2.0, 0.0, 0.0)));
    assert_eq!(rejections.lock().len(), 1);

    // Into free space
    drag(&mut app, &ids[0], Vec3::new(-2.0, 0.0, 0.0), Vec3::new(-2.0, 0.0, 3.0));
    assert_eq!(app.position_of(&ids[0]), Some(Vec3::new(-2.0, 0.0, 3.0)));
    assert_eq!(app.selection().read().selected(), &[ids[0].clone()]);

    assert!(app.undo());
    assert_eq!(app.position_of(&ids[0]), Some(Vec3::new(-2.0, 0.0, 0.0)));
}

#[test]
fn test_delete_selection_is_one_undo_step() {
    let mut app = Application::new(small_lot()).unwrap();
    app.tools_mut().activate(PLACE_TOOL_ID).unwrap();
    app.select_item(Some(crate_item()));
    app.handle_input(&click(-2.5, 0.0));
    app.handle_input(&click(2.5, 0.0));
    let ids = placed(&app);

    app.tools_mut().activate(SELECT_TOOL_ID).unwrap();
    app.handle_input(&ToolInput::Click(
        PointerEvent::at(Vec3::new(-2.5, 0.0, 0.0)).with_entity(ids[0].clone()),
    ));
    app.handle_input(&ToolInput::Click(
        PointerEvent::at(Vec3::new(2.5, 0.0, 0.0))
            .with_entity(ids[1].clone())
            .with_modifiers(Modifiers::SHIFT),
    ));
    assert_eq!(app.selection().read().count(), 2);

    app.tools_mut().activate(DELETE_TOOL_ID).unwrap();
    app.handle_input(&ToolInput::KeyDown(KeyEvent::new(Key::Delete)));

    assert!(placed(&app).is_empty());
    assert!(app.selection().read().is_empty());

    assert!(app.undo());
    assert_eq!(placed(&app), ids);
}

#[test]
fn test_destroyed_entities_leave_selection() {
    let app = Application::new(small_lot()).unwrap();
    let snapshots = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&snapshots);
    app.bus()
        .on::<SelectionChanged, _>(move |snapshot| s.lock().push(snapshot.selected.len()));

    app.bus().emit::<PlacementRequested>(PlacementRequest {
        item: crate_item(),
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
    });
    let id = placed(&app)[0].clone();
    let change = app.selection().write().select(id.clone(), SelectionMode::Replace);
    change.publish(app.bus());

    app.bus().emit::<DeleteRequested>(DeleteRequest { entity_ids: vec![id] });

    assert!(app.selection().read().is_empty());
    assert_eq!(*snapshots.lock(), vec![1, 0]);
}

#[test]
fn test_command_events_reach_listeners() {
    let mut app = Application::new(small_lot()).unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));
    let l = Arc::clone(&log);
    app.bus()
        .on::<CommandExecuted, _>(move |info| l.lock().push(format!("do {}", info.description)));
    let l = Arc::clone(&log);
    app.bus()
        .on::<CommandUndone, _>(move |info| l.lock().push(format!("undo {}", info.description)));

    app.tools_mut().activate(PLACE_TOOL_ID).unwrap();
    app.select_item(Some(crate_item()));
    app.handle_input(&click(0.0, 0.0));
    app.undo();

    assert_eq!(*log.lock(), vec!["do Place crate", "undo Place crate"]);
}

#[test]
fn test_wall_tool_builds_without_history() {
    let mut app = Application::new(small_lot()).unwrap();
    let created = Arc::new(Mutex::new(0));
    let c = Arc::clone(&created);
    app.bus().on::<EntityCreated, _>(move |_| *c.lock() += 1);

    app.tools_mut().activate(WALL_TOOL_ID).unwrap();
    app.handle_input(&click(-3.0, -3.0));
    app.handle_input(&ToolInput::Click(
        PointerEvent::at(Vec3::new(3.0, 0.0, -3.0)).with_modifiers(Modifiers::SHIFT),
    ));
    app.handle_input(&click(3.0, 3.0));

    let walls = app.entities().get_entities_with_component(ComponentType::Wall);
    assert_eq!(walls.len(), 2);
    assert_eq!(*created.lock(), 2);
    assert!(walls.iter().all(|w| w.get::<Wall>().is_some_and(|w| w.height == 2.5)));
    assert!(!app.can_undo());
}

#[test]
fn test_hud_clicks_never_reach_tools() {
    let mut app = Application::new(small_lot()).unwrap();
    app.tools_mut().activate(PLACE_TOOL_ID).unwrap();
    app.select_item(Some(crate_item()));

    let result = app.handle_input(&ToolInput::Click(PointerEvent::at(Vec3::ZERO).over_hud()));
    assert_eq!(result, ToolResult::None);
    assert!(placed(&app).is_empty());
}

#[test]
fn test_config_drives_history_and_default_tool() {
    let config = EditorConfig::from_toml_str(
        r#"
        [lot]
        width = 10.0
        depth = 10.0

        [history]
        max_size = 2

        [tools]
        default_tool = "place"
        "#,
    )
    .unwrap();
    let mut app = Application::new(config).unwrap();
    assert_eq!(app.tools().active_id(), Some(PLACE_TOOL_ID));

    app.select_item(Some(PlacementItem::new(
        "stool",
        Footprint::boxed(0.5, 0.5, 0.5).unwrap(),
        Render::default(),
    )));
    for x in [-3.0, -1.0, 1.0, 3.0] {
        app.handle_input(&click(x, 0.0));
    }

    assert_eq!(placed(&app).len(), 4);
    assert_eq!(app.commands().history_size(), 2);
}
