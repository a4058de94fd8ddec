//! Tool strategy trait and input types.

use atrium_core::{EntityId, Vec2, Vec3};
use thiserror::Error;

/// Unique identifier for a tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToolId(pub &'static str);

impl ToolId {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tool manager errors
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

/// Result of tool operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToolResult {
    /// No action taken
    None,
    /// Tool handled the input, continue
    Handled,
    /// Tool completed an action
    Completed,
    /// Tool wants to switch to another tool
    SwitchTo(ToolId),
}

/// Interaction mode announced when the active tool changes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EditorMode {
    /// No tool active
    #[default]
    Idle,
    View,
    Select,
    Place,
    Move,
    Delete,
    Build,
    Sample,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };

    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
    };
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// Pointer input, already projected into the world by the input layer.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerEvent {
    /// Hit point on the floor plane
    pub world_position: Vec3,
    pub screen_position: Vec2,
    /// Normalized device coordinates
    pub ndc: Vec2,
    pub modifiers: Modifiers,
    pub button: PointerButton,
    /// The pointer is over a HUD element
    pub hud_target: bool,
    /// Entity under the pointer, when picking found one
    pub entity_id: Option<EntityId>,
}

impl PointerEvent {
    /// Primary-button event at a world position with nothing picked
    pub fn at(world_position: Vec3) -> Self {
        Self {
            world_position,
            screen_position: Vec2::ZERO,
            ndc: Vec2::ZERO,
            modifiers: Modifiers::NONE,
            button: PointerButton::Primary,
            hud_target: false,
            entity_id: None,
        }
    }

    pub fn with_entity(mut self, entity_id: EntityId) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn over_hud(mut self) -> Self {
        self.hud_target = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Backspace,
    Delete,
    Char(char),
    /// Any other key, by name
    Named(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// Case-insensitive character match
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.key, Key::Char(k) if k.eq_ignore_ascii_case(&c))
    }
}

/// Raw input forwarded to the active tool
#[derive(Clone, Debug, PartialEq)]
pub enum ToolInput {
    PointerMove(PointerEvent),
    PointerDown(PointerEvent),
    PointerUp(PointerEvent),
    Click(PointerEvent),
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
}

impl ToolInput {
    pub fn pointer(&self) -> Option<&PointerEvent> {
        match self {
            ToolInput::PointerMove(e)
            | ToolInput::PointerDown(e)
            | ToolInput::PointerUp(e)
            | ToolInput::Click(e) => Some(e),
            ToolInput::KeyDown(_) | ToolInput::KeyUp(_) => None,
        }
    }
}

/// An interchangeable tool behavior.
///
/// Strategies receive their collaborators (event bus, entity manager,
/// selection) at construction and translate raw input into domain events.
pub trait ToolStrategy: Send + Sync {
    /// Unique identifier for this tool.
    fn id(&self) -> ToolId;

    /// Display name.
    fn name(&self) -> &str;

    /// Keyboard shortcut (e.g., "V", "W").
    fn shortcut(&self) -> Option<&str> {
        None
    }

    /// Mode announced while this tool is active.
    fn mode(&self) -> EditorMode;

    /// Called when tool becomes active.
    fn activate(&mut self) {}

    /// Called when tool becomes inactive. Drops any half-finished gesture.
    fn deactivate(&mut self) {}

    /// Handle one input.
    fn handle_input(&mut self, input: &ToolInput) -> ToolResult;
}
