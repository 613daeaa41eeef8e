//! A small, single-threaded Entity Component System.
//!
//! The runtime is layered the same way it is used:
//!
//! - [`component::ComponentManager`] owns sparse, type-keyed component storage and answers set
//!   queries over component types.
//! - [`entity::EntityManager`] owns entity identity (with id reuse), guards component access by
//!   liveness and owns the world's [`event::EventManager`].
//! - [`world::WorldContext`] is the facade handed to systems.
//! - [`system::SystemManager`] drives init, update and reactive systems against a world.
//!
//! ```rust,ignore
//! use tiny_ecs::{Component, component::ComponentManager, entity::EntityManager};
//! use tiny_ecs::{system::SystemManager, world::WorldContext};
//!
//! #[derive(Component)]
//! struct Position { x: f32, y: f32 }
//!
//! let mut systems = SystemManager::new(WorldContext::new(EntityManager::new(
//!     ComponentManager::new(),
//! )));
//!
//! let world = systems.world_mut();
//! let player = world.create_entity(Some("player"));
//! world.entity_mut(player)?.add(Position { x: 0.0, y: 0.0 });
//!
//! systems.init()?;
//! systems.update(1.0 / 60.0)?;
//! ```

// Lets the derive macros refer to `::tiny_ecs` from inside this crate.
extern crate self as tiny_ecs;

pub mod component;
pub mod entity;
pub mod error;
pub mod event;
pub mod system;
pub(crate) mod util;
pub mod world;

pub use component::Component;
pub use error::{Error, Result};
pub use event::Event;
pub use tiny_ecs_macros::{Component, Event};
