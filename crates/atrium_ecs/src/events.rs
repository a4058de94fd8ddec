//! Lifecycle events emitted by the entity manager

use atrium_core::EntityId;
use atrium_event::event;

use crate::component::Component;
use crate::entity::Entity;

/// Payload of [`ComponentAdded`]
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentAddedPayload {
    pub entity_id: EntityId,
    pub component: Component,
    /// True when a component of the same type was overwritten
    pub replaced: bool,
}

/// Payload of [`ComponentRemoved`]
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentRemovedPayload {
    pub entity_id: EntityId,
    pub component: Component,
}

/// Payload of [`EntitiesCleared`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntitiesClearedPayload {
    pub count: usize,
}

event!(
    /// A new entity was stored; carries the stored snapshot
    pub EntityCreated => Entity, "entityCreated"
);
event!(
    /// An entity was removed; carries its last snapshot
    pub EntityDestroyed => Entity, "entityDestroyed"
);
event!(pub ComponentAdded => ComponentAddedPayload, "componentAdded");
event!(pub ComponentRemoved => ComponentRemovedPayload, "componentRemoved");
event!(
    /// Every entity was removed at once
    pub EntitiesCleared => EntitiesClearedPayload, "entitiesCleared"
);
