use log::{debug, warn};

use crate::{
    component::{Component, ComponentManager, IntoSpec, Spec},
    entity::{Allocator, Entity, Id, Ref, RefMut},
    error::{Error, Result},
    event::EventManager,
};

/// Owns entity identity and lifecycle, and routes component access through a liveness check.
///
/// Entity records live in a dense slot vector indexed by id. Destroyed entities keep their
/// slot (marked dead) until the id is handed out again by the [`Allocator`].
pub struct EntityManager {
    /// Id source with FIFO reuse of destroyed ids.
    allocator: Allocator,

    /// Entity records indexed by id. Dead entries are waiting for reuse.
    slots: Vec<Entity>,

    /// Number of live entities.
    active: usize,

    /// Component storage for every entity in this manager.
    components: ComponentManager,

    /// The event dispatcher of the world this manager belongs to.
    events: EventManager,
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new(ComponentManager::new())
    }
}

impl EntityManager {
    /// Create an entity manager storing components in the given component manager.
    pub fn new(components: ComponentManager) -> Self {
        Self {
            allocator: Allocator::new(),
            slots: Vec::new(),
            active: 0,
            components,
            events: EventManager::new(),
        }
    }

    /// Create a live entity, reusing the oldest destroyed id if there is one.
    pub fn create_entity(&mut self, name: Option<&str>) -> &Entity {
        let id = self.allocator.alloc();
        let entity = Entity::new(id, name.map(str::to_owned));
        self.active += 1;

        debug!("Created entity {id} ({})", name.unwrap_or("unnamed"));

        let index = id.index();
        if index == self.slots.len() {
            self.slots.push(entity);
        } else {
            self.slots[index] = entity;
        }
        &self.slots[index]
    }

    /// Destroy an entity, purging its components and releasing its id for reuse.
    ///
    /// Returns `false` if the id is unknown or already destroyed.
    pub fn destroy_entity(&mut self, id: Id) -> bool {
        let Some(entity) = self.slots.get_mut(id.index()).filter(|entity| entity.is_alive())
        else {
            warn!("Attempted to destroy an entity that is not alive: {id}");
            return false;
        };

        let purged = self.components.remove_all(id);
        entity.kill();
        self.allocator.free(id);
        self.active -= 1;

        debug!("Destroyed entity {id}, purged {purged} component(s)");
        true
    }

    /// Whether the id names a live entity.
    #[inline]
    pub fn is_alive(&self, id: Id) -> bool {
        self.slots
            .get(id.index())
            .is_some_and(|entity| entity.is_alive())
    }

    /// Look up a live entity.
    pub fn get_entity_by_id(&self, id: Id) -> Result<&Entity> {
        self.slots
            .get(id.index())
            .filter(|entity| entity.is_alive())
            .ok_or(Error::EntityNotFound(id))
    }

    /// Iterate all live entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.slots.iter().filter(|entity| entity.is_alive())
    }

    /// A read-only handle to a live entity.
    pub fn entity(&self, id: Id) -> Result<Ref<'_>> {
        let entity = self.get_entity_by_id(id)?;
        Ok(Ref::new(entity, &self.components))
    }

    /// A mutable handle to a live entity.
    pub fn entity_mut(&mut self, id: Id) -> Result<RefMut<'_>> {
        let entity = self
            .slots
            .get(id.index())
            .filter(|entity| entity.is_alive())
            .ok_or(Error::EntityNotFound(id))?;
        Ok(RefMut::new(entity, &mut self.components))
    }

    /// Attach a component to a live entity, returning the value it replaced.
    pub fn add_component<C: Component>(&mut self, id: Id, value: C) -> Result<Option<C>> {
        self.ensure_alive(id)?;
        Ok(self.components.add_component(id, value))
    }

    /// Detach a component from a live entity.
    pub fn remove_component<C: Component>(&mut self, id: Id) -> Result<Option<C>> {
        self.ensure_alive(id)?;
        Ok(self.components.remove_component::<C>(id))
    }

    /// Whether a live entity has a component of type `C`. Dead ids have nothing.
    pub fn has_component<C: Component>(&self, id: Id) -> bool {
        self.is_alive(id) && self.components.has_component::<C>(id)
    }

    pub fn get_component<C: Component>(&self, id: Id) -> Result<&C> {
        self.ensure_alive(id)?;
        self.components.get_component::<C>(id)
    }

    pub fn get_component_mut<C: Component>(&mut self, id: Id) -> Result<&mut C> {
        self.ensure_alive(id)?;
        self.components.get_component_mut::<C>(id)
    }

    /// Live entities that have every component type in `S`.
    pub fn entities_with_all<S: IntoSpec>(&self) -> Vec<Id> {
        self.entities_with_all_of(&self.components.registry().spec::<S>())
    }

    /// Live entities that have at least one component type in `S`.
    pub fn entities_with_any<S: IntoSpec>(&self) -> Vec<Id> {
        self.entities_with_any_of(&self.components.registry().spec::<S>())
    }

    pub fn entities_with_all_of(&self, spec: &Spec) -> Vec<Id> {
        self.only_alive(self.components.entities_with_all_of(spec))
    }

    pub fn entities_with_any_of(&self, spec: &Spec) -> Vec<Id> {
        self.only_alive(self.components.entities_with_any_of(spec))
    }

    #[inline]
    pub fn num_of_active_entities(&self) -> usize {
        self.active
    }

    /// Number of destroyed ids waiting to be reused.
    #[inline]
    pub fn num_of_reusable_entities(&self) -> usize {
        self.allocator.reusable()
    }

    #[inline]
    pub fn num_of_active_components(&self) -> usize {
        self.components.num_of_active_components()
    }

    #[inline]
    pub fn average_num_of_components_per_entity(&self) -> f32 {
        self.components.average_num_of_components_per_entity()
    }

    #[inline]
    pub fn components(&self) -> &ComponentManager {
        &self.components
    }

    #[inline]
    pub fn events(&self) -> &EventManager {
        &self.events
    }

    #[inline]
    pub fn events_mut(&mut self) -> &mut EventManager {
        &mut self.events
    }

    #[inline]
    fn ensure_alive(&self, id: Id) -> Result<()> {
        if self.is_alive(id) {
            Ok(())
        } else {
            Err(Error::EntityNotFound(id))
        }
    }

    fn only_alive(&self, mut ids: Vec<Id>) -> Vec<Id> {
        ids.retain(|id| self.is_alive(*id));
        ids
    }
}
