//! Entity manager - the authoritative entity store
//!
//! All structural changes go through [`EntityManager`], which emits a
//! lifecycle event for each one. Events are emitted after the store lock is
//! released, so handlers are free to query the manager again.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use atrium_core::{EntityId, IdGenerator};
use atrium_event::EventBus;
use parking_lot::{Mutex, RwLock};

use crate::component::{Component, ComponentType};
use crate::entity::Entity;
use crate::error::{ComponentError, EcsError, Result};
use crate::events::{
    ComponentAdded, ComponentAddedPayload, ComponentRemoved, ComponentRemovedPayload,
    EntitiesCleared, EntitiesClearedPayload, EntityCreated, EntityDestroyed,
};

/// Read-only access to entities, for systems that must not mutate them
pub type EntityLookup = Arc<dyn Fn(&EntityId) -> Option<Entity> + Send + Sync>;

static INSTANCE: Mutex<Option<Arc<EntityManager>>> = parking_lot::const_mutex(None);

/// Entity manager configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityManagerConfig {
    /// Prefix of generated ids (`<prefix>-N`)
    pub id_prefix: String,
    /// Upper bound on stored entities; `None` is unbounded
    pub max_entities: Option<usize>,
}

impl Default for EntityManagerConfig {
    fn default() -> Self {
        Self {
            id_prefix: IdGenerator::DEFAULT_PREFIX.to_string(),
            max_entities: None,
        }
    }
}

/// Parameters for [`EntityManager::create_entity`]
#[derive(Clone, Debug, Default)]
pub struct EntityConfig {
    /// Explicit id; generated when `None`
    pub id: Option<EntityId>,
    pub components: Vec<Component>,
}

impl EntityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_component(mut self, component: impl Into<Component>) -> Self {
        self.components.push(component.into());
        self
    }
}

impl From<&Entity> for EntityConfig {
    /// Config that recreates `entity` under the same id
    fn from(entity: &Entity) -> Self {
        Self {
            id: Some(entity.id().clone()),
            components: entity.components().cloned().collect(),
        }
    }
}

/// Store statistics
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityStats {
    pub total_entities: usize,
    /// Number of entities carrying each component type
    pub component_counts: BTreeMap<ComponentType, usize>,
    pub entities_created: u64,
    pub entities_destroyed: u64,
}

/// Authoritative mapping from id to entity
pub struct EntityManager {
    entities: RwLock<HashMap<EntityId, Entity>>,
    ids: IdGenerator,
    bus: EventBus,
    config: EntityManagerConfig,
    created: AtomicU64,
    destroyed: AtomicU64,
}

impl EntityManager {
    /// Create a new manager publishing on `bus`
    pub fn new(config: EntityManagerConfig, bus: EventBus) -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
            ids: IdGenerator::new(&config.id_prefix),
            bus,
            config,
            created: AtomicU64::new(0),
            destroyed: AtomicU64::new(0),
        }
    }

    /// Process-wide instance.
    ///
    /// The first call constructs it; later calls return the cached instance
    /// and ignore their arguments.
    pub fn instance(config: EntityManagerConfig, bus: EventBus) -> Arc<Self> {
        INSTANCE
            .lock()
            .get_or_insert_with(|| {
                log::debug!("Creating shared entity manager");
                Arc::new(Self::new(config, bus))
            })
            .clone()
    }

    /// Drop the process-wide instance so the next `instance` call builds a fresh one
    pub fn reset_instance() {
        if INSTANCE.lock().take().is_some() {
            log::debug!("Shared entity manager reset");
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn config(&self) -> &EntityManagerConfig {
        &self.config
    }

    /// Store a new entity and emit [`EntityCreated`]
    pub fn create_entity(&self, config: EntityConfig) -> Result<Entity> {
        for component in &config.components {
            check_component(component)?;
        }

        let entity = {
            let mut entities = self.entities.write();

            if let Some(max) = self.config.max_entities {
                if entities.len() >= max {
                    return Err(EcsError::CapacityExceeded { max });
                }
            }

            let id = match config.id {
                Some(id) => {
                    if entities.contains_key(&id) {
                        return Err(EcsError::DuplicateEntity(id));
                    }
                    id
                }
                // Explicit ids may already occupy a generated slot
                None => loop {
                    let id = self.ids.next();
                    if !entities.contains_key(&id) {
                        break id;
                    }
                },
            };

            let entity = Entity::with_components(id.clone(), config.components);
            entities.insert(id, entity.clone());
            entity
        };

        self.created.fetch_add(1, Ordering::Relaxed);
        log::debug!("Created entity {} {:?}", entity.id(), entity.component_types());
        self.bus.emit::<EntityCreated>(entity.clone());
        Ok(entity)
    }

    /// Remove an entity and emit [`EntityDestroyed`]. `None` if it did not exist.
    pub fn destroy_entity(&self, id: &EntityId) -> Option<Entity> {
        let removed = self.entities.write().remove(id)?;
        self.destroyed.fetch_add(1, Ordering::Relaxed);
        log::debug!("Destroyed entity {}", id);
        self.bus.emit::<EntityDestroyed>(removed.clone());
        Some(removed)
    }

    /// Set a component, replacing any of the same type, and emit [`ComponentAdded`]
    pub fn add_component(&self, id: &EntityId, component: impl Into<Component>) -> Result<Entity> {
        let component = component.into();
        check_component(&component)?;

        let (updated, replaced) = {
            let mut entities = self.entities.write();
            let current = entities
                .get_mut(id)
                .ok_or_else(|| EcsError::NotFound(id.clone()))?;
            let replaced = current.has(component.component_type());
            *current = current.with_component(component.clone());
            (current.clone(), replaced)
        };

        log::trace!(
            "{} {} on {}",
            if replaced { "Replaced" } else { "Added" },
            component.component_type(),
            id
        );
        self.bus.emit::<ComponentAdded>(ComponentAddedPayload {
            entity_id: id.clone(),
            component,
            replaced,
        });
        Ok(updated)
    }

    /// Remove a component and emit [`ComponentRemoved`]. `None` if there was nothing to remove.
    pub fn remove_component(&self, id: &EntityId, ty: ComponentType) -> Option<Component> {
        let removed = {
            let mut entities = self.entities.write();
            let current = entities.get_mut(id)?;
            let removed = current.component(ty)?.clone();
            *current = current.without_component(ty);
            removed
        };

        log::trace!("Removed {} from {}", ty, id);
        self.bus.emit::<ComponentRemoved>(ComponentRemovedPayload {
            entity_id: id.clone(),
            component: removed.clone(),
        });
        Some(removed)
    }

    pub fn get_entity(&self, id: &EntityId) -> Option<Entity> {
        self.entities.read().get(id).cloned()
    }

    #[inline]
    pub fn has_entity(&self, id: &EntityId) -> bool {
        self.entities.read().contains_key(id)
    }

    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.read().len()
    }

    /// Snapshot of every entity, sorted by id
    pub fn get_all_entities(&self) -> Vec<Entity> {
        let mut all: Vec<Entity> = self.entities.read().values().cloned().collect();
        all.sort_by(|a, b| a.id().cmp(b.id()));
        all
    }

    /// Entities carrying a component of type `ty`, sorted by id
    pub fn get_entities_with_component(&self, ty: ComponentType) -> Vec<Entity> {
        let mut matching: Vec<Entity> = self
            .entities
            .read()
            .values()
            .filter(|e| e.has(ty))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.id().cmp(b.id()));
        matching
    }

    /// Read-only lookup closure over this manager
    pub fn lookup(self: &Arc<Self>) -> EntityLookup {
        let manager = Arc::clone(self);
        Arc::new(move |id: &EntityId| manager.get_entity(id))
    }

    /// Remove every entity and emit a single [`EntitiesCleared`]
    pub fn clear(&self) {
        let count = {
            let mut entities = self.entities.write();
            let count = entities.len();
            entities.clear();
            count
        };
        self.destroyed.fetch_add(count as u64, Ordering::Relaxed);
        log::info!("Cleared {} entities", count);
        self.bus.emit::<EntitiesCleared>(EntitiesClearedPayload { count });
    }

    pub fn get_stats(&self) -> EntityStats {
        let entities = self.entities.read();
        let mut component_counts = BTreeMap::new();
        for ty in entities.values().flat_map(|e| e.component_types()) {
            *component_counts.entry(ty).or_insert(0) += 1;
        }
        EntityStats {
            total_entities: entities.len(),
            component_counts,
            entities_created: self.created.load(Ordering::Relaxed),
            entities_destroyed: self.destroyed.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityManager")
            .field("entities", &self.entity_count())
            .field("config", &self.config)
            .finish()
    }
}

fn check_component(component: &Component) -> Result<()> {
    let result = component.validate();
    if result.is_valid {
        Ok(())
    } else {
        Err(ComponentError::InvalidState {
            component: component.component_type().as_str(),
            reason: result.errors.join("; "),
        }
        .into())
    }
}
