//! Tool manager - at most one active tool.

use std::collections::HashMap;

use atrium_event::EventBus;

use super::tool::{EditorMode, ToolError, ToolId, ToolInput, ToolResult, ToolStrategy};
use crate::events::{ModeChanged, ToolActivated, ToolDeactivated};

/// Registry of tool strategies with a single active slot.
pub struct ToolManager {
    tools: HashMap<ToolId, Box<dyn ToolStrategy>>,
    active: Option<ToolId>,
    previous: Option<ToolId>,
    bus: EventBus,
}

impl ToolManager {
    pub fn new(bus: EventBus) -> Self {
        Self {
            tools: HashMap::new(),
            active: None,
            previous: None,
            bus,
        }
    }

    /// Register a tool under its own id, replacing any tool with that id.
    ///
    /// If the replaced tool is active it is deactivated and the new one takes
    /// over the active slot without a tool change being announced.
    pub fn register(&mut self, mut tool: Box<dyn ToolStrategy>) {
        let id = tool.id();
        let is_active = self.active == Some(id);

        if let Some(mut old) = self.tools.remove(&id) {
            if is_active {
                old.deactivate();
            }
            log::debug!("Replacing tool '{}'", id);
        }
        if is_active {
            tool.activate();
        }
        self.tools.insert(id, tool);
    }

    /// Make `id` the active tool. Activating the active tool does nothing.
    pub fn activate(&mut self, id: ToolId) -> Result<(), ToolError> {
        if self.active == Some(id) {
            return Ok(());
        }
        if !self.tools.contains_key(&id) {
            return Err(ToolError::UnknownTool(id.to_string()));
        }

        self.deactivate_current();

        self.active = Some(id);
        let mode = match self.tools.get_mut(&id) {
            Some(tool) => {
                tool.activate();
                tool.mode()
            }
            None => EditorMode::Idle,
        };

        log::info!("Activated tool '{}'", id);
        self.bus.emit::<ToolActivated>(id);
        self.bus.emit::<ModeChanged>(mode);
        Ok(())
    }

    /// Activate a tool by its id text
    pub fn activate_named(&mut self, name: &str) -> Result<(), ToolError> {
        let id = self
            .find(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        self.activate(id)
    }

    /// Deactivate the active tool, if any
    pub fn deactivate(&mut self) {
        if self.deactivate_current() {
            self.bus.emit::<ModeChanged>(EditorMode::Idle);
        }
    }

    fn deactivate_current(&mut self) -> bool {
        let Some(current) = self.active.take() else {
            return false;
        };
        if let Some(tool) = self.tools.get_mut(&current) {
            tool.deactivate();
        }
        self.previous = Some(current);
        log::debug!("Deactivated tool '{}'", current);
        self.bus.emit::<ToolDeactivated>(current);
        true
    }

    /// Switch back to the tool that was active before the current one
    pub fn activate_previous(&mut self) -> Result<(), ToolError> {
        match self.previous {
            Some(prev) => self.activate(prev),
            None => Ok(()),
        }
    }

    /// Forward input to the active tool.
    ///
    /// Dropped when no tool is active. Pointer input over the HUD never
    /// reaches a tool.
    pub fn handle_input(&mut self, input: &ToolInput) -> ToolResult {
        let Some(id) = self.active else {
            return ToolResult::None;
        };
        if input.pointer().is_some_and(|p| p.hud_target) {
            return ToolResult::None;
        }

        let result = match self.tools.get_mut(&id) {
            Some(tool) => tool.handle_input(input),
            None => ToolResult::None,
        };

        if let ToolResult::SwitchTo(next) = result {
            if let Err(err) = self.activate(next) {
                log::warn!("Tool '{}' asked to switch: {}", id, err);
            }
        }
        result
    }

    /// Get the active tool ID.
    pub fn active_id(&self) -> Option<ToolId> {
        self.active
    }

    /// Mode of the active tool; `Idle` when none
    pub fn active_mode(&self) -> EditorMode {
        self.active
            .and_then(|id| self.tools.get(&id))
            .map_or(EditorMode::Idle, |tool| tool.mode())
    }

    /// Get a tool by ID.
    pub fn get(&self, id: ToolId) -> Option<&dyn ToolStrategy> {
        self.tools.get(&id).map(|t| t.as_ref())
    }

    /// Look up a registered id by its text
    pub fn find(&self, name: &str) -> Option<ToolId> {
        self.tools.keys().copied().find(|id| id.as_str() == name)
    }

    /// Get all registered tool IDs, sorted.
    pub fn tool_ids(&self) -> Vec<ToolId> {
        let mut ids: Vec<ToolId> = self.tools.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Find tool by shortcut key (case-insensitive).
    pub fn find_by_shortcut(&self, key: &str) -> Option<ToolId> {
        self.tools
            .iter()
            .find(|(_, tool)| tool.shortcut().is_some_and(|s| s.eq_ignore_ascii_case(key)))
            .map(|(id, _)| *id)
    }
}
