//! # atrium_ecs - Entity/Component Store
//!
//! Immutable entities backed by a persistent map, and the [`EntityManager`]
//! that owns them:
//! - **Components**: transform, render, physics, wall, floor, tool tag, footprint
//! - **Entities**: values; every change produces a new snapshot
//! - **Manager**: single writer, emits lifecycle events on the shared bus
//!
//! ```ignore
//! let bus = EventBus::new();
//! let manager = EntityManager::new(EntityManagerConfig::default(), bus.clone());
//! let chair = manager.create_entity(EntityConfig::new().with_component(Transform::default()))?;
//! manager.add_component(chair.id(), Render::new([0.8, 0.2, 0.2]))?;
//! ```

pub mod component;
pub mod entity;
pub mod error;
pub mod events;
pub mod manager;

pub use component::*;
pub use entity::Entity;
pub use events::*;
pub use error::{ComponentError, EcsError, Result};
pub use manager::{EntityConfig, EntityLookup, EntityManager, EntityManagerConfig, EntityStats};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::component::{
        Component, ComponentKind, ComponentType, Floor, Footprint, FootprintShape, MeshKind,
        Physics, Render, ToolTag, Transform, Wall,
    };
    pub use crate::entity::Entity;
    pub use crate::error::{ComponentError, EcsError};
    pub use crate::events::*;
    pub use crate::manager::{EntityConfig, EntityLookup, EntityManager, EntityManagerConfig};
}
