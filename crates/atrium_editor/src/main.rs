//! Atrium headless editor session
//!
//! Builds the editor core from an optional TOML config and replays a short
//! scripted session through the tools, logging every step.
//!
//! Run with: cargo run -p atrium_editor -- [config.toml]

use std::process::ExitCode;

use atrium_core::Vec3;
use atrium_ecs::{ComponentType, Footprint, Render};
use atrium_editor::events::{BuildCompleted, PlacementRejected};
use atrium_editor::prelude::*;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => match EditorConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load config {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => EditorConfig::default(),
    };
    config.log_summary();

    let mut app = match Application::new(config) {
        Ok(app) => app,
        Err(e) => {
            log::error!("Failed to start editor: {}", e);
            return ExitCode::FAILURE;
        }
    };

    app.bus().on::<PlacementRejected, _>(|rejection| {
        log::warn!("Rejected '{}': {}", rejection.item, rejection.errors.join("; "));
    });
    app.bus().on::<BuildCompleted, _>(|build| {
        log::info!("Built {:?} {}", build.kind, build.entity_id);
    });

    if let Err(e) = run_session(&mut app) {
        log::error!("Session aborted: {}", e);
        app.shutdown();
        return ExitCode::FAILURE;
    }

    let stats = app.entities().get_stats();
    log::info!(
        "Session done: {} entities, {} created, {} destroyed",
        stats.total_entities,
        stats.entities_created,
        stats.entities_destroyed
    );
    app.shutdown();
    ExitCode::SUCCESS
}

fn click(at: Vec3) -> ToolInput {
    ToolInput::Click(PointerEvent::at(at))
}

fn run_session(app: &mut Application) -> Result<(), Box<dyn std::error::Error>> {
    // Walls around a 4m x 3m room
    app.tools_mut().activate(WALL_TOOL_ID)?;
    let corners = [
        Vec3::new(-2.0, 0.0, -1.5),
        Vec3::new(2.0, 0.0, -1.5),
        Vec3::new(2.0, 0.0, 1.5),
        Vec3::new(-2.0, 0.0, 1.5),
        Vec3::new(-2.0, 0.0, -1.5),
    ];
    app.handle_input(&click(corners[0]));
    for corner in &corners[1..] {
        let chained = PointerEvent::at(*corner).with_modifiers(Modifiers::SHIFT);
        app.handle_input(&ToolInput::Click(chained));
    }
    app.handle_input(&ToolInput::KeyDown(KeyEvent::new(Key::Escape)));

    // Floor under it
    app.tools_mut().activate(FLOOR_TOOL_ID)?;
    for corner in &corners[..4] {
        app.handle_input(&click(*corner));
    }
    app.handle_input(&ToolInput::KeyDown(KeyEvent::new(Key::Enter)));

    // Furniture
    app.tools_mut().activate(PLACE_TOOL_ID)?;
    app.select_item(Some(PlacementItem::new(
        "sofa",
        Footprint::boxed(2.0, 0.9, 0.8)?,
        Render::new([0.3, 0.3, 0.5]),
    )));
    app.handle_input(&click(Vec3::new(0.0, 0.0, -0.5)));
    // Overlaps the sofa
    app.handle_input(&click(Vec3::new(0.5, 0.0, -0.5)));

    app.select_item(Some(PlacementItem::new(
        "lamp",
        Footprint::boxed(0.4, 0.4, 1.6)?,
        Render::new([0.9, 0.8, 0.4]),
    )));
    app.handle_input(&ToolInput::KeyDown(KeyEvent::new(Key::Char('r'))));
    app.handle_input(&click(Vec3::new(1.5, 0.0, 1.0)));

    let placed = app.entities().get_entities_with_component(ComponentType::Footprint);
    log::info!("{} objects placed", placed.len());

    if app.undo() {
        log::info!("Undid last placement");
    }
    if app.redo() {
        log::info!("Redid last placement");
    }

    // Drag the lamp
    if let Some(lamp) = placed.last() {
        app.tools_mut().activate(MOVE_TOOL_ID)?;
        let from = app.position_of(lamp.id()).unwrap_or(Vec3::ZERO);
        let to = Vec3::new(-1.5, 0.0, 1.0);
        let grab = PointerEvent::at(from).with_entity(lamp.id().clone());
        app.handle_input(&ToolInput::PointerDown(grab));
        app.handle_input(&ToolInput::PointerMove(PointerEvent::at(to)));
        app.handle_input(&ToolInput::PointerUp(PointerEvent::at(to)));
        log::info!("Lamp now at {:?}", app.position_of(lamp.id()));
    }

    let history: Vec<String> = app
        .commands()
        .history()
        .into_iter()
        .map(|info| info.description)
        .collect();
    log::info!("History: {}", history.join(", "));

    app.tick();
    Ok(())
}
