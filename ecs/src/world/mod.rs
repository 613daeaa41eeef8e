//! The world facade handed to systems.

use crate::{
    component::{Component, IntoSpec, Spec},
    entity::{self, Entity, EntityManager},
    error::Result,
    event::EventManager,
};

/// A snapshot of world statistics, computed when requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    /// Live entities.
    pub active_entities: usize,

    /// Destroyed ids waiting to be reused.
    pub reusable_entities: usize,

    /// Stored component values.
    pub active_components: usize,

    /// Mean number of components over entities that have any.
    pub average_components_per_entity: f32,
}

/// Entity, query and event operations of one world, behind a single handle.
///
/// Everything forwards to the [`EntityManager`] passed in at construction.
#[derive(Default)]
pub struct WorldContext {
    entities: EntityManager,
}

impl WorldContext {
    pub fn new(entities: EntityManager) -> Self {
        Self { entities }
    }

    /// Create an entity and return its id.
    pub fn create_entity(&mut self, name: Option<&str>) -> entity::Id {
        self.entities.create_entity(name).id()
    }

    /// Destroy an entity. Returns `false` if it was not alive.
    #[inline]
    pub fn destroy_entity(&mut self, id: entity::Id) -> bool {
        self.entities.destroy_entity(id)
    }

    #[inline]
    pub fn get_entity_by_id(&self, id: entity::Id) -> Result<&Entity> {
        self.entities.get_entity_by_id(id)
    }

    #[inline]
    pub fn entity(&self, id: entity::Id) -> Result<entity::Ref<'_>> {
        self.entities.entity(id)
    }

    #[inline]
    pub fn entity_mut(&mut self, id: entity::Id) -> Result<entity::RefMut<'_>> {
        self.entities.entity_mut(id)
    }

    /// Iterate live entities in id order.
    #[inline]
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.entities()
    }

    #[inline]
    pub fn get_component<C: Component>(&self, id: entity::Id) -> Result<&C> {
        self.entities.get_component::<C>(id)
    }

    #[inline]
    pub fn get_component_mut<C: Component>(&mut self, id: entity::Id) -> Result<&mut C> {
        self.entities.get_component_mut::<C>(id)
    }

    /// Live entities that have every component type in `S`.
    #[inline]
    pub fn entities_with_all<S: IntoSpec>(&self) -> Vec<entity::Id> {
        self.entities.entities_with_all::<S>()
    }

    /// Live entities that have at least one component type in `S`.
    #[inline]
    pub fn entities_with_any<S: IntoSpec>(&self) -> Vec<entity::Id> {
        self.entities.entities_with_any::<S>()
    }

    #[inline]
    pub fn entities_with_all_of(&self, spec: &Spec) -> Vec<entity::Id> {
        self.entities.entities_with_all_of(spec)
    }

    #[inline]
    pub fn entities_with_any_of(&self, spec: &Spec) -> Vec<entity::Id> {
        self.entities.entities_with_any_of(spec)
    }

    #[inline]
    pub fn events(&self) -> &EventManager {
        self.entities.events()
    }

    #[inline]
    pub fn events_mut(&mut self) -> &mut EventManager {
        self.entities.events_mut()
    }

    #[inline]
    pub fn entity_manager(&self) -> &EntityManager {
        &self.entities
    }

    #[inline]
    pub fn entity_manager_mut(&mut self) -> &mut EntityManager {
        &mut self.entities
    }

    /// Current world statistics.
    pub fn statistics(&self) -> Stats {
        Stats {
            active_entities: self.entities.num_of_active_entities(),
            reusable_entities: self.entities.num_of_reusable_entities(),
            active_components: self.entities.num_of_active_components(),
            average_components_per_entity: self.entities.average_num_of_components_per_entity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use tiny_ecs_macros::{Component, Event};

    use super::*;
    use crate::event::{Failure, Listener};

    #[derive(Component)]
    struct Health(u32);

    #[derive(Component)]
    struct Armor;

    #[derive(Event)]
    struct Spawned(entity::Id);

    #[derive(Default)]
    struct Spawns(Vec<entity::Id>);

    impl Listener<Spawned> for Spawns {
        fn on_event(&mut self, event: &Spawned) -> std::result::Result<(), Failure> {
            self.0.push(event.0);
            Ok(())
        }
    }

    #[test]
    fn statistics_snapshot() {
        // Given
        let mut world = WorldContext::default();
        let a = world.create_entity(Some("a"));
        let b = world.create_entity(Some("b"));
        let c = world.create_entity(None);
        world.entity_mut(a).unwrap().add(Health(10));
        world.entity_mut(a).unwrap().add(Armor);
        world.entity_mut(b).unwrap().add(Health(5));

        // When
        world.destroy_entity(c);
        let stats = world.statistics();

        // Then
        assert_eq!(
            stats,
            Stats {
                active_entities: 2,
                reusable_entities: 1,
                active_components: 3,
                average_components_per_entity: 1.5,
            }
        );
    }

    #[test]
    fn empty_world_statistics() {
        let world = WorldContext::new(EntityManager::default());

        let stats = world.statistics();

        assert_eq!(stats.active_entities, 0);
        assert_eq!(stats.average_components_per_entity, 0.0);
    }

    #[test]
    fn forwards_queries_and_events() {
        // Given
        let mut world = WorldContext::default();
        let spawns = Rc::new(RefCell::new(Spawns::default()));
        let handle: Rc<RefCell<dyn Listener<Spawned>>> = spawns.clone();
        world.events_mut().subscribe(Rc::downgrade(&handle)).unwrap();

        // When
        let a = world.create_entity(None);
        world.entity_mut(a).unwrap().add(Health(1));
        world.events().notify(&Spawned(a)).unwrap();
        world.get_component_mut::<Health>(a).unwrap().0 = 2;

        // Then
        assert_eq!(world.entities_with_all::<Health>(), vec![a]);
        assert!(world.entities_with_any::<Armor>().is_empty());
        assert_eq!(world.get_component::<Health>(a).unwrap().0, 2);
        assert_eq!(spawns.borrow().0, vec![a]);
        assert_eq!(world.get_entity_by_id(a).unwrap().id(), a);
    }
}
