//! Immutable entity value

use atrium_core::EntityId;
use im::OrdMap;

use crate::component::{Component, ComponentKind, ComponentType};

/// An id plus at most one component per [`ComponentType`].
///
/// Entities are values. `with_component` and `without_component` return a new
/// entity sharing structure with the original, which is left untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    id: EntityId,
    components: OrdMap<ComponentType, Component>,
}

impl Entity {
    /// Create an entity with no components
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            components: OrdMap::new(),
        }
    }

    /// Create an entity from components; later duplicates of a type win
    pub fn with_components(id: EntityId, components: impl IntoIterator<Item = Component>) -> Self {
        let components = components
            .into_iter()
            .map(|c| (c.component_type(), c))
            .collect();
        Self { id, components }
    }

    #[inline]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Get a component by type
    pub fn component(&self, ty: ComponentType) -> Option<&Component> {
        self.components.get(&ty)
    }

    /// Get a typed component
    ///
    /// ```ignore
    /// let transform = entity.get::<Transform>();
    /// ```
    pub fn get<T: ComponentKind>(&self) -> Option<&T> {
        self.components.get(&T::TYPE).and_then(T::from_component)
    }

    #[inline]
    pub fn has(&self, ty: ComponentType) -> bool {
        self.components.contains_key(&ty)
    }

    /// Component types present, in tag order
    pub fn component_types(&self) -> Vec<ComponentType> {
        self.components.keys().copied().collect()
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Return a copy with `component` set, replacing any of the same type
    pub fn with_component(&self, component: impl Into<Component>) -> Self {
        let component = component.into();
        Self {
            id: self.id.clone(),
            components: self.components.update(component.component_type(), component),
        }
    }

    /// Return a copy without the component of type `ty`
    pub fn without_component(&self, ty: ComponentType) -> Self {
        Self {
            id: self.id.clone(),
            components: self.components.without(&ty),
        }
    }
}
