use std::{any::Any, mem};

use crate::{
    component::{Component, index::DynamicIndex},
    entity,
};

/// Sparse-set storage for every value of a single component type.
///
/// Values and their owning entities are packed densely (`values[row]` belongs to
/// `entities[row]`), while a [`DynamicIndex`] maps entity ids back to rows. Removal
/// swap-removes, so the dense order only depends on the sequence of inserts and removes.
#[derive(Debug)]
pub(crate) struct Bucket<C: Component> {
    /// Entity id to dense row.
    index: DynamicIndex,

    /// Owning entity of each row.
    entities: Vec<entity::Id>,

    /// Component value of each row.
    values: Vec<C>,
}

impl<C: Component> Bucket<C> {
    /// Create an empty bucket whose sparse index uses the given block size.
    #[inline]
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            index: DynamicIndex::with_block_size(block_size),
            entities: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Store a value for the entity, returning the value it replaced.
    pub fn insert(&mut self, entity: entity::Id, value: C) -> Option<C> {
        if let Some(row) = self.index.get(entity).copied() {
            return Some(mem::replace(&mut self.values[row], value));
        }

        let row = self.values.len();
        self.entities.push(entity);
        self.values.push(value);
        self.index.insert(entity, row);
        None
    }

    /// Remove and return the entity's value.
    pub fn remove(&mut self, entity: entity::Id) -> Option<C> {
        let row = self.index.remove(entity)?;

        let value = self.values.swap_remove(row);
        self.entities.swap_remove(row);

        // The previous last row now lives at `row`.
        if let Some(&moved) = self.entities.get(row) {
            self.index.insert(moved, row);
        }

        Some(value)
    }

    #[inline]
    pub fn get(&self, entity: entity::Id) -> Option<&C> {
        self.index.get(entity).copied().map(|row| &self.values[row])
    }

    #[inline]
    pub fn get_mut(&mut self, entity: entity::Id) -> Option<&mut C> {
        self.index.get(entity).copied().map(|row| &mut self.values[row])
    }
}

/// Type-erased view of a [`Bucket`], so buckets of every component type can share one
/// collection. Typed access downcasts through [`as_any`](Self::as_any).
pub(crate) trait ErasedBucket {
    /// Drop the entity's value, if any. Returns whether a value was removed.
    fn remove_entity(&mut self, entity: entity::Id) -> bool;

    /// Whether the entity has a value in this bucket.
    fn contains(&self, entity: entity::Id) -> bool;

    /// Number of stored values.
    fn len(&self) -> usize;

    /// Owning entities in dense order.
    fn entities(&self) -> &[entity::Id];

    /// Returns a reference to self as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable reference to self as `&mut dyn Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedBucket for Bucket<C> {
    fn remove_entity(&mut self, entity: entity::Id) -> bool {
        self.remove(entity).is_some()
    }

    #[inline]
    fn contains(&self, entity: entity::Id) -> bool {
        self.index.get(entity).is_some()
    }

    #[inline]
    fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    fn entities(&self) -> &[entity::Id] {
        &self.entities
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
