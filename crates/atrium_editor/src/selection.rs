//! Selection management with multi-select support.
//!
//! Modifier mapping:
//! - Click: Replace selection
//! - Shift+Click: Add to selection
//! - Ctrl+Click: Remove from selection
//! - Ctrl+Shift+Click: Toggle selection
//!
//! Mutators return a [`SelectionChange`] that the caller publishes once any
//! lock around the manager has been released.

use std::sync::Arc;

use atrium_core::EntityId;
use atrium_event::EventBus;
use parking_lot::RwLock;

use crate::events::{EntityDeselected, EntitySelected, SelectionChanged, SelectionSnapshot};

/// Selection shared between tools
pub type SharedSelection = Arc<RwLock<SelectionManager>>;

/// Selection mode based on modifier keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Replace current selection (normal click)
    #[default]
    Replace,
    /// Add to current selection (Shift+click)
    Add,
    /// Remove from current selection (Ctrl+click)
    Remove,
    /// Toggle selection state (Ctrl+Shift+click)
    Toggle,
}

impl SelectionMode {
    /// Determine selection mode from modifier keys.
    pub fn from_modifiers(shift: bool, ctrl: bool) -> Self {
        match (shift, ctrl) {
            (true, true) => Self::Toggle,
            (true, false) => Self::Add,
            (false, true) => Self::Remove,
            (false, false) => Self::Replace,
        }
    }
}

/// Difference produced by one selection operation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionChange {
    pub added: Vec<EntityId>,
    pub removed: Vec<EntityId>,
    pub primary_changed: bool,
    /// Selection after the operation
    pub snapshot: SelectionSnapshot,
}

impl SelectionChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && !self.primary_changed
    }

    /// Emit `EntityDeselected`, `EntitySelected` and a final `SelectionChanged`.
    ///
    /// Nothing is emitted for an empty change.
    pub fn publish(self, bus: &EventBus) {
        if self.is_empty() {
            return;
        }
        for id in self.removed {
            bus.emit::<EntityDeselected>(id);
        }
        for id in self.added {
            bus.emit::<EntitySelected>(id);
        }
        bus.emit::<SelectionChanged>(self.snapshot);
    }
}

/// Manages entity selection with multi-select support.
#[derive(Clone, Debug, Default)]
pub struct SelectionManager {
    /// Currently selected entities (in selection order)
    selected: Vec<EntityId>,
    /// Primary selected entity (last selected)
    primary: Option<EntityId>,
    /// Whether selection has changed since last checked
    dirty: bool,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty selection behind a shared lock
    pub fn shared() -> SharedSelection {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Get the primary (last selected) entity.
    pub fn primary(&self) -> Option<&EntityId> {
        self.primary.as_ref()
    }

    /// Get all selected entities.
    pub fn selected(&self) -> &[EntityId] {
        &self.selected
    }

    /// Get number of selected entities.
    pub fn count(&self) -> usize {
        self.selected.len()
    }

    /// Check if any entities are selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Check if a specific entity is selected.
    pub fn is_selected(&self, id: &EntityId) -> bool {
        self.selected.contains(id)
    }

    /// Check and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            selected: self.selected.clone(),
            primary: self.primary.clone(),
        }
    }

    /// Select an entity with the given mode.
    pub fn select(&mut self, id: EntityId, mode: SelectionMode) -> SelectionChange {
        let before = self.selected.clone();
        let primary_before = self.primary.clone();

        match mode {
            SelectionMode::Replace => {
                self.selected.clear();
                self.selected.push(id.clone());
                self.primary = Some(id);
            }
            SelectionMode::Add => {
                if !self.selected.contains(&id) {
                    self.selected.push(id.clone());
                }
                self.primary = Some(id);
            }
            SelectionMode::Remove => self.drop_id(&id),
            SelectionMode::Toggle => {
                if self.selected.contains(&id) {
                    self.drop_id(&id);
                } else {
                    self.selected.push(id.clone());
                    self.primary = Some(id);
                }
            }
        }
        self.diff(before, primary_before)
    }

    /// Select multiple entities (replaces current selection).
    pub fn select_multiple(&mut self, ids: impl IntoIterator<Item = EntityId>) -> SelectionChange {
        let before = self.selected.clone();
        let primary_before = self.primary.clone();
        self.selected.clear();
        for id in ids {
            if !self.selected.contains(&id) {
                self.selected.push(id);
            }
        }
        self.primary = self.selected.last().cloned();
        self.diff(before, primary_before)
    }

    /// Clear all selection.
    pub fn clear(&mut self) -> SelectionChange {
        let before = std::mem::take(&mut self.selected);
        let primary_before = self.primary.take();
        self.diff(before, primary_before)
    }

    /// Remove an entity from selection (e.g., when entity is deleted).
    pub fn remove_entity(&mut self, id: &EntityId) -> SelectionChange {
        let before = self.selected.clone();
        let primary_before = self.primary.clone();
        self.drop_id(id);
        self.diff(before, primary_before)
    }

    fn drop_id(&mut self, id: &EntityId) {
        self.selected.retain(|e| e != id);
        if self.primary.as_ref() == Some(id) {
            self.primary = self.selected.last().cloned();
        }
    }

    fn diff(&mut self, before: Vec<EntityId>, primary_before: Option<EntityId>) -> SelectionChange {
        let added: Vec<EntityId> = self
            .selected
            .iter()
            .filter(|id| !before.contains(id))
            .cloned()
            .collect();
        let removed: Vec<EntityId> = before
            .into_iter()
            .filter(|id| !self.selected.contains(id))
            .collect();
        let change = SelectionChange {
            added,
            removed,
            primary_changed: self.primary != primary_before,
            snapshot: self.snapshot(),
        };
        if !change.is_empty() {
            self.dirty = true;
        }
        change
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn id(s: &str) -> EntityId {
        EntityId::new(s).unwrap()
    }

    #[test]
    fn test_selection_replace() {
        let mut sel = SelectionManager::new();
        sel.select(id("a"), SelectionMode::Replace);
        let change = sel.select(id("b"), SelectionMode::Replace);

        assert_eq!(sel.selected(), &[id("b")]);
        assert_eq!(change.added, vec![id("b")]);
        assert_eq!(change.removed, vec![id("a")]);
        assert!(sel.take_dirty());
        assert!(!sel.take_dirty());
    }

    #[test]
    fn test_selection_add_remove_toggle() {
        let mut sel = SelectionManager::new();
        sel.select(id("a"), SelectionMode::Add);
        sel.select(id("b"), SelectionMode::Add);
        assert_eq!(sel.count(), 2);
        assert_eq!(sel.primary(), Some(&id("b")));

        sel.select(id("b"), SelectionMode::Remove);
        assert_eq!(sel.primary(), Some(&id("a")));

        sel.select(id("a"), SelectionMode::Toggle);
        assert!(sel.is_empty());
        assert_eq!(sel.primary(), None);
    }

    #[test]
    fn test_reselect_is_empty_change() {
        let mut sel = SelectionManager::new();
        sel.select(id("a"), SelectionMode::Replace);
        assert!(sel.select(id("a"), SelectionMode::Replace).is_empty());
        assert!(sel.remove_entity(&id("zzz")).is_empty());
    }

    #[test]
    fn test_publish_emits_deselect_select_then_changed() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let l = Arc::clone(&log);
        bus.on::<EntityDeselected, _>(move |id| l.lock().push(format!("-{id}")));
        let l = Arc::clone(&log);
        bus.on::<EntitySelected, _>(move |id| l.lock().push(format!("+{id}")));
        let l = Arc::clone(&log);
        bus.on::<SelectionChanged, _>(move |s| l.lock().push(format!("={}", s.selected.len())));

        let mut sel = SelectionManager::new();
        sel.select(id("a"), SelectionMode::Replace).publish(&bus);
        sel.select(id("b"), SelectionMode::Replace).publish(&bus);
        sel.clear().publish(&bus);
        sel.clear().publish(&bus);

        assert_eq!(*log.lock(), vec!["+a", "=1", "-a", "+b", "=1", "-b", "=0"]);
    }
}
