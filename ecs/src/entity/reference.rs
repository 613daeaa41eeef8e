use crate::{
    component::{Component, ComponentManager, IntoSpec, Spec},
    entity::{Entity, Id},
    error::Result,
};

/// A read-only handle to a live entity and its components.
///
/// Handles borrow the [`EntityManager`](crate::entity::EntityManager), so they can only be
/// obtained for entities that are alive at the time of the call and cannot outlive them.
pub struct Ref<'w> {
    entity: &'w Entity,
    components: &'w ComponentManager,
}

impl<'w> Ref<'w> {
    #[inline]
    pub(crate) fn new(entity: &'w Entity, components: &'w ComponentManager) -> Self {
        Self { entity, components }
    }

    /// The id of the entity.
    #[inline]
    pub fn id(&self) -> Id {
        self.entity.id()
    }

    /// The display name of the entity, if one was given.
    #[inline]
    pub fn name(&self) -> Option<&'w str> {
        self.entity.name()
    }

    /// Whether the entity has a component of type `C`.
    #[inline]
    pub fn has<C: Component>(&self) -> bool {
        self.components.has_component::<C>(self.id())
    }

    /// Whether the entity has every component type in `S`. An empty `S` matches nothing.
    ///
    /// Handy in reactive system filters: `entity.has_all::<(Position, Velocity)>()`.
    pub fn has_all<S: IntoSpec>(&self) -> bool {
        has_all::<S>(self.components, self.id())
    }

    /// Whether the entity has at least one component type in `S`.
    pub fn has_any<S: IntoSpec>(&self) -> bool {
        has_any::<S>(self.components, self.id())
    }

    /// Get the entity's component of type `C`.
    #[inline]
    pub fn get<C: Component>(&self) -> Result<&'w C> {
        self.components.get_component::<C>(self.id())
    }

    /// The component types attached to the entity.
    #[inline]
    pub fn components(&self) -> Spec {
        self.components.component_types_of(self.id())
    }
}

/// A mutable handle to a live entity, allowing components to be added, removed and changed.
pub struct RefMut<'w> {
    entity: &'w Entity,
    components: &'w mut ComponentManager,
}

impl<'w> RefMut<'w> {
    #[inline]
    pub(crate) fn new(entity: &'w Entity, components: &'w mut ComponentManager) -> Self {
        Self { entity, components }
    }

    #[inline]
    pub fn id(&self) -> Id {
        self.entity.id()
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.entity.name()
    }

    #[inline]
    pub fn has<C: Component>(&self) -> bool {
        self.components.has_component::<C>(self.id())
    }

    pub fn has_all<S: IntoSpec>(&self) -> bool {
        has_all::<S>(self.components, self.id())
    }

    pub fn has_any<S: IntoSpec>(&self) -> bool {
        has_any::<S>(self.components, self.id())
    }

    #[inline]
    pub fn get<C: Component>(&self) -> Result<&C> {
        self.components.get_component::<C>(self.id())
    }

    #[inline]
    pub fn get_mut<C: Component>(&mut self) -> Result<&mut C> {
        let id = self.id();
        self.components.get_component_mut::<C>(id)
    }

    /// Attach a component, returning the value it replaced.
    #[inline]
    pub fn add<C: Component>(&mut self, value: C) -> Option<C> {
        let id = self.id();
        self.components.add_component(id, value)
    }

    /// Detach and return the component of type `C`.
    #[inline]
    pub fn remove<C: Component>(&mut self) -> Option<C> {
        let id = self.id();
        self.components.remove_component::<C>(id)
    }

    #[inline]
    pub fn components(&self) -> Spec {
        self.components.component_types_of(self.id())
    }
}

fn has_all<S: IntoSpec>(components: &ComponentManager, entity: Id) -> bool {
    let wanted = components.registry().spec::<S>();
    !wanted.is_empty() && components.component_types_of(entity).contains_all(&wanted)
}

fn has_any<S: IntoSpec>(components: &ComponentManager, entity: Id) -> bool {
    let wanted = components.registry().spec::<S>();
    components.component_types_of(entity).contains_any(&wanted)
}
