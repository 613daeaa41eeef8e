use std::any::type_name;

use fixedbitset::FixedBitSet;

use crate::{
    component::{
        Component, Id, IntoSpec, Registry, Spec,
        bucket::{Bucket, ErasedBucket},
        index::{DEFAULT_BLOCK_SIZE, DynamicIndex},
    },
    entity,
    error::{Error, Result},
};

/// Sparse, type-keyed storage for component values.
///
/// Storage is logically `map<component type, map<entity, value>>`: one [`Bucket`] per
/// component type, created the first time a value of that type is stored. Alongside the
/// buckets the manager keeps a bitmask per entity recording which component ids it owns, so
/// a bulk purge only visits the buckets the entity is actually in.
///
/// The manager does not know whether an entity is alive. Guarding against dead ids is the job
/// of the [`EntityManager`](crate::entity::EntityManager).
pub struct ComponentManager {
    /// Rust type to component id.
    registry: Registry,

    /// Type-erased buckets indexed by component id.
    buckets: Vec<Option<Box<dyn ErasedBucket>>>,

    /// Component ids owned by each entity. Entities without components have no mask.
    masks: DynamicIndex<FixedBitSet>,

    /// Total number of stored component values.
    active_components: usize,

    /// Number of entities owning at least one component.
    populated_entities: usize,

    /// Block size for each bucket's sparse index.
    block_size: usize,
}

impl Default for ComponentManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentManager {
    /// Create an empty component manager.
    #[inline]
    pub fn new() -> Self {
        Self::with_block_size(DEFAULT_BLOCK_SIZE)
    }

    /// Create an empty component manager whose sparse indices (per-type rows and per-entity
    /// masks) allocate `block_size` entity slots at a time.
    ///
    /// Smaller blocks suit worlds with few entities spread over many types; larger blocks suit
    /// dense worlds. A block size of 0 is bumped to 1.
    pub fn with_block_size(block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            registry: Registry::new(),
            buckets: Vec::new(),
            masks: DynamicIndex::with_block_size(block_size),
            active_components: 0,
            populated_entities: 0,
            block_size,
        }
    }

    /// The component type registry used by this manager.
    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Store `value` for the entity, replacing (and returning) any value of the same type.
    pub fn add_component<C: Component>(&mut self, entity: entity::Id, value: C) -> Option<C> {
        let id = self.registry.register::<C>();
        let replaced = self.bucket_or_insert::<C>(id).insert(entity, value);

        if replaced.is_none() {
            self.track_added(entity, id);
        }

        replaced
    }

    /// Remove and return the entity's component of type `C`. Absent components are a no-op.
    pub fn remove_component<C: Component>(&mut self, entity: entity::Id) -> Option<C> {
        let id = self.registry.get::<C>()?;
        let removed = self.bucket_mut::<C>(id)?.remove(entity)?;

        self.track_removed(entity, id);

        Some(removed)
    }

    /// Whether the entity has a component of type `C`.
    pub fn has_component<C: Component>(&self, entity: entity::Id) -> bool {
        self.registry
            .get::<C>()
            .is_some_and(|id| self.owns(entity, id))
    }

    /// Get the entity's component of type `C`.
    pub fn get_component<C: Component>(&self, entity: entity::Id) -> Result<&C> {
        self.registry
            .get::<C>()
            .and_then(|id| self.bucket::<C>(id))
            .and_then(|bucket| bucket.get(entity))
            .ok_or_else(|| not_found::<C>(entity))
    }

    /// Get mutable access to the entity's component of type `C`.
    pub fn get_component_mut<C: Component>(&mut self, entity: entity::Id) -> Result<&mut C> {
        let Some(id) = self.registry.get::<C>() else {
            return Err(not_found::<C>(entity));
        };

        self.bucket_mut::<C>(id)
            .and_then(|bucket| bucket.get_mut(entity))
            .ok_or_else(|| not_found::<C>(entity))
    }

    /// Remove every component attached to the entity, returning how many were removed.
    ///
    /// The purge completes before this returns; no caller can observe a partially stripped
    /// entity.
    pub fn remove_all(&mut self, entity: entity::Id) -> usize {
        let Some(owned) = self.masks.remove(entity) else {
            return 0;
        };

        let mut removed = 0;
        for index in owned.ones() {
            if let Some(Some(bucket)) = self.buckets.get_mut(index)
                && bucket.remove_entity(entity)
            {
                removed += 1;
            }
        }

        self.active_components -= removed;
        self.populated_entities -= 1;

        removed
    }

    /// The component types attached to the entity.
    pub fn component_types_of(&self, entity: entity::Id) -> Spec {
        self.masks
            .get(entity)
            .map(|mask| mask.ones().map(Id::from).collect())
            .unwrap_or(Spec::EMPTY)
    }

    /// Entities that have every component type in `S`, e.g. `entities_with_all::<(A, B)>()`.
    pub fn entities_with_all<S: IntoSpec>(&self) -> Vec<entity::Id> {
        self.entities_with_all_of(&self.registry.spec::<S>())
    }

    /// Entities that have at least one component type in `S`.
    pub fn entities_with_any<S: IntoSpec>(&self) -> Vec<entity::Id> {
        self.entities_with_any_of(&self.registry.spec::<S>())
    }

    /// Entities that have every component type in the spec.
    ///
    /// An empty spec matches nothing. The smallest bucket is walked and every candidate is
    /// checked against the remaining buckets, so the cost is
    /// `O(smallest bucket × remaining types)`. Results come out in the smallest bucket's order.
    pub fn entities_with_all_of(&self, spec: &Spec) -> Vec<entity::Id> {
        let mut buckets = Vec::with_capacity(spec.len());
        for id in spec.ids() {
            match self.erased(*id) {
                Some(bucket) => buckets.push(bucket),
                // A type that was never stored cannot be on any entity.
                None => return Vec::new(),
            }
        }

        buckets.sort_by_key(|bucket| bucket.len());
        let Some((smallest, rest)) = buckets.split_first() else {
            return Vec::new();
        };

        smallest
            .entities()
            .iter()
            .copied()
            .filter(|entity| rest.iter().all(|bucket| bucket.contains(*entity)))
            .collect()
    }

    /// Entities that have at least one component type in the spec, without duplicates.
    ///
    /// Buckets are visited in component id order and each in its dense order, so identical
    /// insertion histories give identical results.
    pub fn entities_with_any_of(&self, spec: &Spec) -> Vec<entity::Id> {
        let buckets: Vec<_> = spec.ids().iter().filter_map(|id| self.erased(*id)).collect();
        let mut found = Vec::new();

        for (position, bucket) in buckets.iter().enumerate() {
            // Entities in an earlier bucket were already collected.
            let earlier = &buckets[..position];
            found.extend(
                bucket
                    .entities()
                    .iter()
                    .copied()
                    .filter(|entity| !earlier.iter().any(|other| other.contains(*entity))),
            );
        }

        found
    }

    /// Total number of stored component values.
    #[inline]
    pub fn num_of_active_components(&self) -> usize {
        self.active_components
    }

    /// Mean number of components over the entities that own at least one component.
    #[inline]
    pub fn average_num_of_components_per_entity(&self) -> f32 {
        if self.populated_entities == 0 {
            0.0
        } else {
            self.active_components as f32 / self.populated_entities as f32
        }
    }

    /// Whether the entity's mask has the component id set.
    #[inline]
    fn owns(&self, entity: entity::Id, id: Id) -> bool {
        self.masks
            .get(entity)
            .is_some_and(|mask| mask.contains(id.index()))
    }

    fn track_added(&mut self, entity: entity::Id, id: Id) {
        let mask = self.masks.get_or_insert_with(entity, FixedBitSet::new);
        if mask.is_clear() {
            self.populated_entities += 1;
        }
        mask.grow(id.index() + 1);
        mask.insert(id.index());

        self.active_components += 1;
    }

    fn track_removed(&mut self, entity: entity::Id, id: Id) {
        if let Some(mask) = self.masks.get_mut(entity) {
            mask.set(id.index(), false);
            if mask.is_clear() {
                self.masks.remove(entity);
                self.populated_entities -= 1;
            }
        }

        self.active_components -= 1;
    }

    #[inline]
    fn erased(&self, id: Id) -> Option<&dyn ErasedBucket> {
        self.buckets.get(id.index())?.as_deref()
    }

    fn bucket<C: Component>(&self, id: Id) -> Option<&Bucket<C>> {
        self.erased(id)?.as_any().downcast_ref::<Bucket<C>>()
    }

    fn bucket_mut<C: Component>(&mut self, id: Id) -> Option<&mut Bucket<C>> {
        self.buckets
            .get_mut(id.index())?
            .as_mut()?
            .as_any_mut()
            .downcast_mut::<Bucket<C>>()
    }

    fn bucket_or_insert<C: Component>(&mut self, id: Id) -> &mut Bucket<C> {
        let index = id.index();
        if index >= self.buckets.len() {
            self.buckets.resize_with(index + 1, || None);
        }

        let block_size = self.block_size;
        let bucket = self.buckets[index]
            .get_or_insert_with(|| Box::new(Bucket::<C>::with_block_size(block_size)));

        match bucket.as_any_mut().downcast_mut::<Bucket<C>>() {
            Some(bucket) => bucket,
            None => unreachable!(
                "component id {id} is registered to a type other than {}",
                type_name::<C>()
            ),
        }
    }
}

#[inline]
fn not_found<C: Component>(entity: entity::Id) -> Error {
    Error::ComponentNotFound {
        entity,
        component: type_name::<C>(),
    }
}
