use std::{
    any::TypeId,
    sync::atomic::{AtomicU32, Ordering},
};

use dashmap::DashMap;

use crate::component::{Component, Id, IntoSpec, Spec};

/// Maps Rust component types to dense component [`Id`]s.
///
/// Registration takes `&self` so read-only paths (queries naming a type that was never stored)
/// can resolve ids without exclusive access. Lookups are lock-free reads via `DashMap`.
#[derive(Debug)]
pub struct Registry {
    /// Map from TypeId to component Id.
    type_map: DashMap<TypeId, Id>,

    /// Next available component identifier.
    next_id: AtomicU32,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a new component registry.
    #[inline]
    pub fn new() -> Self {
        Self {
            type_map: DashMap::new(),
            next_id: AtomicU32::new(0),
        }
    }

    /// Register a component type and get its unique identifier.
    ///
    /// If the component type is already registered, returns the existing id.
    pub fn register<C: Component>(&self) -> Id {
        let type_id = TypeId::of::<C>();

        // Fast path: already registered
        if let Some(id) = self.type_map.get(&type_id) {
            return *id;
        }

        *self
            .type_map
            .entry(type_id)
            .or_insert_with(|| Id(self.next_id.fetch_add(1, Ordering::Relaxed)))
            .value()
    }

    /// Get the component id for a provided type `C`, if registered.
    #[inline]
    pub fn get<C: Component>(&self) -> Option<Id> {
        self.type_map
            .get(&TypeId::of::<C>())
            .map(|entry| *entry.value())
    }

    /// Get a component specification for a generic type `IS` which implements [`IntoSpec`].
    #[inline]
    pub fn spec<IS: IntoSpec>(&self) -> Spec {
        IS::into_spec(self)
    }

    /// The number of registered component types.
    #[inline]
    pub fn len(&self) -> usize {
        self.next_id.load(Ordering::Relaxed) as usize
    }

    /// Whether no component type has been registered yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Position;
    impl Component for Position {}

    struct Velocity;
    impl Component for Velocity {}

    // Structurally identical to Velocity, still a distinct component.
    struct Heading;
    impl Component for Heading {}

    #[test]
    fn registration_is_idempotent() {
        // Given
        let registry = Registry::new();

        // When
        let pos_id = registry.register::<Position>();
        let vel_id = registry.register::<Velocity>();

        // Then
        assert_ne!(pos_id, vel_id);
        assert_eq!(registry.register::<Position>(), pos_id);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn get_unregistered_is_none() {
        // Given
        let registry = Registry::new();
        registry.register::<Position>();

        // Then
        assert!(registry.get::<Position>().is_some());
        assert!(registry.get::<Velocity>().is_none());
    }

    #[test]
    fn identical_shapes_get_distinct_ids() {
        let registry = Registry::new();

        assert_ne!(registry.register::<Velocity>(), registry.register::<Heading>());
    }

    #[test]
    fn ids_are_dense() {
        // Given
        let registry = Registry::new();
        assert!(registry.is_empty());

        // When
        let ids = [
            registry.register::<Position>(),
            registry.register::<Velocity>(),
            registry.register::<Heading>(),
        ];

        // Then
        let mut indices: Vec<_> = ids.iter().map(|id| id.index()).collect();
        indices.sort();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
