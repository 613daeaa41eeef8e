//! Component types and their storage.
//!
//! Components are plain data attached to entities. Every component type gets a dense
//! [`Id`] from the [`Registry`] the first time it is stored or queried, and that id selects
//! the per-type bucket inside the [`ComponentManager`].
//!
//! ## Architecture
//!
//! - [`Component`]: the trait all component types implement (usually via
//!   `#[derive(Component)]`)
//! - [`Registry`]: maps Rust types to dense component ids
//! - [`Spec`]: a sorted set of component ids, used to describe queries
//! - [`ComponentManager`]: sparse, type-keyed storage plus set queries
//!
//! ## Usage
//!
//! ```ignore
//! use tiny_ecs::{Component, component::ComponentManager, entity};
//!
//! #[derive(Component)]
//! struct Position { x: f32, y: f32 }
//!
//! let mut components = ComponentManager::new();
//! components.add_component(entity::Id::new(0), Position { x: 1.0, y: 2.0 });
//! let found = components.entities_with_all::<Position>();
//! ```

use std::fmt;

mod bucket;
mod index;
mod manager;
mod registry;
mod spec;

pub use manager::ComponentManager;
pub use registry::Registry;
pub use spec::{IntoSpec, Spec};

/// A component identifier, dense and unique per component type within a [`Registry`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// Construct a new component Id from a raw u32 value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the index of this component if it were to live in indexable storage (e.g. Vec)
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for Id {
    #[inline]
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<usize> for Id {
    #[inline]
    fn from(value: usize) -> Self {
        Self::new(value as u32)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A trait representing a component in the ECS.
///
/// At present this only sets the required trait bounds for a type to be used as a component.
/// Two types are different components even when they are structurally identical.
pub trait Component: 'static + Sized {}
