//! Application wiring.
//!
//! [`Application`] builds every editor service from an [`EditorConfig`] and
//! connects the request events raised by tools to validation and the command
//! stack. Handlers hold weak references so the bus never keeps the services
//! alive on its own.

use std::sync::{Arc, Weak};

use atrium_core::{EntityId, Vec3};
use atrium_ecs::{EntitiesCleared, Entity, EntityConfig, EntityDestroyed, EntityManager, Transform};
use atrium_event::{EventBus, Subscription};
use crate::commands::{
    Command, CommandStack, CreateEntityCommand, DeleteEntityCommand, MoveEntityCommand,
    SharedCommandStack,
};
use crate::config::{ConfigError, ConfigResult, EditorConfig};
use crate::events::{
    DeleteRequest, DeleteRequested, MoveRequest, MoveRequested, PlacementRejected,
    PlacementRejection, PlacementRequest, PlacementRequested,
};
use crate::selection::{SelectionManager, SharedSelection};
use crate::tools::{
    DeleteTool, EyedropperTool, FloorTool, ItemSlot, MoveTool, PlaceTool, PlacementItem,
    SelectTool, ToolInput, ToolManager, ToolResult, ViewTool, WallTool,
};
use crate::validation::{create_placement_validator_with_grid, placed_objects, ValidationSystem};

/// Id given to a placement candidate while it is validated
const CANDIDATE_ID: &str = "placement-candidate";

/// Services reachable from bus handlers
#[derive(Clone)]
struct Services {
    entities: Weak<EntityManager>,
    commands: Weak<SharedCommandStack>,
    validation: Weak<ValidationSystem>,
    candidate_id: EntityId,
}

impl Services {
    fn upgrade(&self) -> Option<(Arc<EntityManager>, Arc<SharedCommandStack>, Arc<ValidationSystem>)> {
        Some((
            self.entities.upgrade()?,
            self.commands.upgrade()?,
            self.validation.upgrade()?,
        ))
    }

    fn on_placement(&self, request: &PlacementRequest) {
        let Some((entities, commands, validation)) = self.upgrade() else {
            return;
        };
        let item = &request.item;
        let config = EntityConfig::new()
            .with_component(Transform::new(request.position).with_rotation(request.rotation))
            .with_component(item.footprint.clone())
            .with_component(item.render.clone());
        let candidate = Entity::with_components(self.candidate_id.clone(), config.components.clone());

        let result = validation.validate(&candidate, request.position);
        if !result.is_valid {
            log::info!("Placement of '{}' rejected: {}", item.name, result.errors.join("; "));
            entities.bus().emit::<PlacementRejected>(PlacementRejection {
                item: item.name.clone(),
                position: request.position,
                errors: result.errors,
            });
            return;
        }
        for warning in &result.warnings {
            log::warn!("Placement of '{}': {}", item.name, warning);
        }

        let command = CreateEntityCommand::new(Arc::clone(&entities), config)
            .with_description(format!("Place {}", item.name));
        commands.execute(Box::new(command));
    }

    fn on_move(&self, request: &MoveRequest) {
        let Some((entities, commands, validation)) = self.upgrade() else {
            return;
        };
        let Some(entity) = entities.get_entity(&request.entity_id) else {
            log::warn!("Move requested for missing entity {}", request.entity_id);
            return;
        };

        let result = validation.validate(&entity, request.to);
        if !result.is_valid {
            log::info!("Move of {} rejected: {}", request.entity_id, result.errors.join("; "));
            entities.bus().emit::<PlacementRejected>(PlacementRejection {
                item: request.entity_id.to_string(),
                position: request.to,
                errors: result.errors,
            });
            return;
        }

        let command = MoveEntityCommand::new(Arc::clone(&entities), request.entity_id.clone(), request.to);
        commands.execute(Box::new(command));
    }

    fn on_delete(&self, request: &DeleteRequest) {
        let Some((entities, commands, _)) = self.upgrade() else {
            return;
        };
        let delete = |id: &EntityId| -> Box<dyn Command> {
            Box::new(DeleteEntityCommand::new(Arc::clone(&entities), id.clone()))
        };

        match request.entity_ids.as_slice() {
            [] => {}
            [id] => {
                commands.execute(delete(id));
            }
            ids => {
                let batch = ids.iter().map(delete).collect();
                commands.execute_batch(format!("Delete {} entities", ids.len()), batch);
            }
        }
    }
}

/// The assembled editor core
pub struct Application {
    config: EditorConfig,
    bus: EventBus,
    entities: Arc<EntityManager>,
    commands: Arc<SharedCommandStack>,
    validation: Arc<ValidationSystem>,
    selection: SharedSelection,
    item: ItemSlot,
    tools: ToolManager,
    subscriptions: Vec<Subscription>,
}

impl Application {
    /// Build every service from `config` and activate the default tool
    pub fn new(config: EditorConfig) -> ConfigResult<Self> {
        config.validate()?;
        let candidate_id = EntityId::new(CANDIDATE_ID)
            .map_err(|err| ConfigError::Invalid(format!("placement candidate id: {err}")))?;

        let bus = EventBus::with_config(config.bus_config());
        let entities = Arc::new(EntityManager::new(config.entity_manager_config(), bus.clone()));
        let commands = Arc::new(SharedCommandStack::new(
            CommandStack::with_capacity(config.history.max_size).with_event_bus(bus.clone()),
        ));

        let validation = ValidationSystem::new(bus.clone(), entities.lookup());
        validation.register_validator(create_placement_validator_with_grid(
            config.lot,
            placed_objects(&entities),
            config.spatial.cell_size,
        ));

        let selection = SelectionManager::shared();
        let item: ItemSlot = Default::default();

        let mut tools = ToolManager::new(bus.clone());
        tools.register(Box::new(ViewTool::new()));
        tools.register(Box::new(SelectTool::new(bus.clone(), Arc::clone(&selection))));
        tools.register(Box::new(PlaceTool::new(bus.clone(), Arc::clone(&item))));
        tools.register(Box::new(MoveTool::new(
            bus.clone(),
            entities.lookup(),
            Arc::clone(&selection),
        )));
        tools.register(Box::new(DeleteTool::new(bus.clone(), Arc::clone(&selection))));
        tools.register(Box::new(
            WallTool::new(bus.clone(), Arc::clone(&entities))
                .with_dimensions(config.tools.wall_height, config.tools.wall_thickness),
        ));
        tools.register(Box::new(
            FloorTool::new(bus.clone(), Arc::clone(&entities))
                .with_close_distance(config.tools.floor_close_distance),
        ));
        tools.register(Box::new(EyedropperTool::new(bus.clone(), entities.lookup())));

        let services = Services {
            entities: Arc::downgrade(&entities),
            commands: Arc::downgrade(&commands),
            validation: Arc::downgrade(&validation),
            candidate_id,
        };
        let subscriptions = Self::subscribe(&bus, &services, &selection);

        let mut app = Self {
            config,
            bus,
            entities,
            commands,
            validation,
            selection,
            item,
            tools,
            subscriptions,
        };

        let default_tool = app.config.tools.default_tool.clone();
        app.tools
            .activate_named(&default_tool)
            .map_err(|err| ConfigError::Invalid(format!("tools.default_tool: {err}")))?;

        log::info!("Editor ready with {} tools", app.tools.tool_ids().len());
        Ok(app)
    }

    fn subscribe(bus: &EventBus, services: &Services, selection: &SharedSelection) -> Vec<Subscription> {
        let mut subscriptions = Vec::new();

        let s = services.clone();
        subscriptions.push(bus.on::<PlacementRequested, _>(move |req| s.on_placement(req)));
        let s = services.clone();
        subscriptions.push(bus.on::<MoveRequested, _>(move |req| s.on_move(req)));
        let s = services.clone();
        subscriptions.push(bus.on::<DeleteRequested, _>(move |req| s.on_delete(req)));

        // Destroyed entities leave the selection
        let sel = Arc::clone(selection);
        let weak = services.entities.clone();
        subscriptions.push(bus.on::<EntityDestroyed, _>(move |entity| {
            let change = sel.write().remove_entity(entity.id());
            if let Some(entities) = weak.upgrade() {
                change.publish(entities.bus());
            }
        }));
        let sel = Arc::clone(selection);
        let weak = services.entities.clone();
        subscriptions.push(bus.on::<EntitiesCleared, _>(move |_| {
            let change = sel.write().clear();
            if let Some(entities) = weak.upgrade() {
                change.publish(entities.bus());
            }
        }));

        subscriptions
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn entities(&self) -> &Arc<EntityManager> {
        &self.entities
    }

    /// The command stack; safe to use from any bus handler
    pub fn commands(&self) -> &Arc<SharedCommandStack> {
        &self.commands
    }

    pub fn validation(&self) -> &Arc<ValidationSystem> {
        &self.validation
    }

    pub fn selection(&self) -> &SharedSelection {
        &self.selection
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ToolManager {
        &mut self.tools
    }

    /// Route one input to the active tool
    pub fn handle_input(&mut self, input: &ToolInput) -> ToolResult {
        self.tools.handle_input(input)
    }

    /// Put an item in the place tool's slot; `None` empties it
    pub fn select_item(&self, item: Option<PlacementItem>) {
        if let Some(item) = &item {
            log::debug!("Picked item '{}'", item.name);
        }
        *self.item.write() = item;
    }

    pub fn pending_item(&self) -> Option<PlacementItem> {
        self.item.read().clone()
    }

    pub fn undo(&self) -> bool {
        self.commands.undo()
    }

    pub fn redo(&self) -> bool {
        self.commands.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.commands.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.commands.can_redo()
    }

    /// Deliver scheduled events that are due; returns how many were delivered
    pub fn tick(&self) -> usize {
        self.bus.process_scheduled()
    }

    /// Tear the session down: tools off, history and entities cleared, bus emptied
    pub fn shutdown(&mut self) {
        self.tools.deactivate();
        self.commands.clear();
        self.entities.clear();

        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        self.validation.detach();
        self.bus.clear_all();
        log::info!("Editor shut down");
    }

    /// Position of an entity's transform, if it has one
    pub fn position_of(&self, id: &EntityId) -> Option<Vec3> {
        self.entities
            .get_entity(id)
            .and_then(|e| e.get::<Transform>().map(|t| t.position))
    }
}
