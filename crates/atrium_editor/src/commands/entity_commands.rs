//! Entity and component commands over the entity manager.

use std::sync::Arc;
use std::time::SystemTime;

use atrium_core::{EntityId, Vec3};
use atrium_ecs::{Component, ComponentType, Entity, EntityConfig, EntityManager, Transform};

use super::{Command, CommandError, CommandResult};

/// Command to create a new entity.
pub struct CreateEntityCommand {
    manager: Arc<EntityManager>,
    config: EntityConfig,
    description: String,
    timestamp: SystemTime,
    // Filled after execution
    created_id: Option<EntityId>,
}

impl CreateEntityCommand {
    pub fn new(manager: Arc<EntityManager>, config: EntityConfig) -> Self {
        Self {
            manager,
            config,
            description: "Create Entity".to_string(),
            timestamp: SystemTime::now(),
            created_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn created_id(&self) -> Option<&EntityId> {
        self.created_id.as_ref()
    }
}

impl Command for CreateEntityCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    fn execute(&mut self) -> CommandResult {
        let entity = self.manager.create_entity(self.config.clone())?;
        // Redo recreates under the same id
        self.config.id = Some(entity.id().clone());
        self.created_id = Some(entity.id().clone());
        Ok(())
    }

    fn undo(&mut self) -> CommandResult {
        let id = self
            .created_id
            .clone()
            .ok_or_else(|| CommandError::InvalidOperation("entity was never created".into()))?;
        self.manager
            .destroy_entity(&id)
            .map(|_| ())
            .ok_or(CommandError::EntityNotFound(id))
    }
}

/// Command to delete an entity.
pub struct DeleteEntityCommand {
    manager: Arc<EntityManager>,
    entity_id: EntityId,
    timestamp: SystemTime,
    // Stored for undo
    deleted: Option<Entity>,
}

impl DeleteEntityCommand {
    pub fn new(manager: Arc<EntityManager>, entity_id: EntityId) -> Self {
        Self {
            manager,
            entity_id,
            timestamp: SystemTime::now(),
            deleted: None,
        }
    }
}

impl Command for DeleteEntityCommand {
    fn description(&self) -> &str {
        "Delete Entity"
    }

    fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    fn execute(&mut self) -> CommandResult {
        let entity = self
            .manager
            .destroy_entity(&self.entity_id)
            .ok_or_else(|| CommandError::EntityNotFound(self.entity_id.clone()))?;
        self.deleted = Some(entity);
        Ok(())
    }

    fn undo(&mut self) -> CommandResult {
        let entity = self
            .deleted
            .take()
            .ok_or_else(|| CommandError::InvalidOperation("No entity to restore".to_string()))?;
        if let Err(err) = self.manager.create_entity(EntityConfig::from(&entity)) {
            self.deleted = Some(entity);
            return Err(err.into());
        }
        Ok(())
    }
}

/// Command to set (add or replace) one component.
pub struct SetComponentCommand {
    manager: Arc<EntityManager>,
    entity_id: EntityId,
    component: Component,
    timestamp: SystemTime,
    // Outer None: not executed yet. Inner None: slot was empty.
    previous: Option<Option<Component>>,
}

impl SetComponentCommand {
    pub fn new(manager: Arc<EntityManager>, entity_id: EntityId, component: impl Into<Component>) -> Self {
        Self {
            manager,
            entity_id,
            component: component.into(),
            timestamp: SystemTime::now(),
            previous: None,
        }
    }
}

impl Command for SetComponentCommand {
    fn description(&self) -> &str {
        "Set Component"
    }

    fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    fn execute(&mut self) -> CommandResult {
        let entity = self
            .manager
            .get_entity(&self.entity_id)
            .ok_or_else(|| CommandError::EntityNotFound(self.entity_id.clone()))?;
        let previous = entity.component(self.component.component_type()).cloned();
        self.manager.add_component(&self.entity_id, self.component.clone())?;
        self.previous = Some(previous);
        Ok(())
    }

    fn undo(&mut self) -> CommandResult {
        match self.previous.take() {
            Some(Some(old)) => {
                self.manager.add_component(&self.entity_id, old)?;
            }
            Some(None) => {
                self.manager
                    .remove_component(&self.entity_id, self.component.component_type())
                    .ok_or_else(|| CommandError::EntityNotFound(self.entity_id.clone()))?;
            }
            None => return Err(CommandError::InvalidOperation("command was never executed".into())),
        }
        Ok(())
    }
}

/// Command to remove one component.
pub struct RemoveComponentCommand {
    manager: Arc<EntityManager>,
    entity_id: EntityId,
    component_type: ComponentType,
    timestamp: SystemTime,
    removed: Option<Component>,
}

impl RemoveComponentCommand {
    pub fn new(manager: Arc<EntityManager>, entity_id: EntityId, component_type: ComponentType) -> Self {
        Self {
            manager,
            entity_id,
            component_type,
            timestamp: SystemTime::now(),
            removed: None,
        }
    }
}

impl Command for RemoveComponentCommand {
    fn description(&self) -> &str {
        "Remove Component"
    }

    fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    fn execute(&mut self) -> CommandResult {
        if !self.manager.has_entity(&self.entity_id) {
            return Err(CommandError::EntityNotFound(self.entity_id.clone()));
        }
        let removed = self
            .manager
            .remove_component(&self.entity_id, self.component_type)
            .ok_or_else(|| {
                CommandError::InvalidOperation(format!(
                    "{} has no {} component",
                    self.entity_id, self.component_type
                ))
            })?;
        self.removed = Some(removed);
        Ok(())
    }

    fn undo(&mut self) -> CommandResult {
        let component = self
            .removed
            .take()
            .ok_or_else(|| CommandError::InvalidOperation("nothing to restore".into()))?;
        self.manager.add_component(&self.entity_id, component)?;
        Ok(())
    }
}

/// Command to move an entity to an absolute position.
pub struct MoveEntityCommand {
    manager: Arc<EntityManager>,
    entity_id: EntityId,
    to: Vec3,
    timestamp: SystemTime,
    from: Option<Vec3>,
}

impl MoveEntityCommand {
    pub fn new(manager: Arc<EntityManager>, entity_id: EntityId, to: Vec3) -> Self {
        Self {
            manager,
            entity_id,
            to,
            timestamp: SystemTime::now(),
            from: None,
        }
    }

    fn transform(&self) -> Result<Transform, CommandError> {
        let entity = self
            .manager
            .get_entity(&self.entity_id)
            .ok_or_else(|| CommandError::EntityNotFound(self.entity_id.clone()))?;
        entity
            .get::<Transform>()
            .copied()
            .ok_or_else(|| CommandError::InvalidOperation(format!("{} has no transform", self.entity_id)))
    }
}

impl Command for MoveEntityCommand {
    fn description(&self) -> &str {
        "Move"
    }

    fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    fn execute(&mut self) -> CommandResult {
        let transform = self.transform()?;
        self.manager
            .add_component(&self.entity_id, transform.with_position(self.to))?;
        self.from = Some(transform.position);
        Ok(())
    }

    fn undo(&mut self) -> CommandResult {
        let from = self
            .from
            .ok_or_else(|| CommandError::InvalidOperation("command was never executed".into()))?;
        let transform = self.transform()?;
        self.manager
            .add_component(&self.entity_id, transform.with_position(from))?;
        Ok(())
    }
}
