//! Editor events
//!
//! Entity lifecycle events live in `atrium_ecs::events`; everything the
//! editor layer adds on top is declared here.

use atrium_core::{EntityId, Vec3};
use atrium_ecs::Render;
use atrium_event::event;

use crate::commands::CommandInfo;
use crate::tools::{EditorMode, PlacementItem, ToolId};

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

event!(pub CommandExecuted => CommandInfo, "commandExecuted");
event!(pub CommandUndone => CommandInfo, "commandUndone");
event!(pub CommandRedone => CommandInfo, "commandRedone");

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

event!(pub ToolActivated => ToolId, "toolActivated");
event!(pub ToolDeactivated => ToolId, "toolDeactivated");
event!(
    /// Mode after a tool change; `Idle` when no tool is active
    pub ModeChanged => EditorMode, "modeChanged"
);

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Selection after a change
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionSnapshot {
    /// In selection order
    pub selected: Vec<EntityId>,
    pub primary: Option<EntityId>,
}

event!(pub SelectionChanged => SelectionSnapshot, "selectionChanged");
event!(pub EntitySelected => EntityId, "entitySelected");
event!(pub EntityDeselected => EntityId, "entityDeselected");

// ---------------------------------------------------------------------------
// Requests raised by tools
// ---------------------------------------------------------------------------

/// Ask for an object to be placed
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementRequest {
    pub item: PlacementItem,
    pub position: Vec3,
    /// Euler angles in radians; `y` is yaw
    pub rotation: Vec3,
}

/// A placement that failed validation
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementRejection {
    pub item: String,
    pub position: Vec3,
    pub errors: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MoveRequest {
    pub entity_id: EntityId,
    pub from: Vec3,
    pub to: Vec3,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteRequest {
    pub entity_ids: Vec<EntityId>,
}

event!(pub PlacementRequested => PlacementRequest, "placementRequested");
event!(pub PlacementRejected => PlacementRejection, "placementRejected");
event!(pub MoveRequested => MoveRequest, "moveRequested");
event!(pub DeleteRequested => DeleteRequest, "deleteRequested");

// ---------------------------------------------------------------------------
// Build and sampling tools
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuildKind {
    Wall,
    Floor,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildResult {
    pub entity_id: EntityId,
    pub kind: BuildKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderSample {
    pub entity_id: EntityId,
    pub render: Render,
}

event!(
    /// A build tool stored a finished wall or floor
    pub BuildCompleted => BuildResult, "buildCompleted"
);
event!(pub RenderSampled => RenderSample, "renderSampled");

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct ValidationRequest {
    pub entity_id: EntityId,
    pub position: Vec3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidationReport {
    pub entity_id: EntityId,
    pub position: Vec3,
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

event!(pub ValidationRequested => ValidationRequest, "validationRequested");
event!(pub ValidationCompleted => ValidationReport, "validationCompleted");
