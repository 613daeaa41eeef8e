//! Systems and the phases they run in.
//!
//! A system is behavior run against a [`WorldContext`]. There are three phases:
//!
//! - [`InitSystem`]s run once, when [`SystemManager::init`] is first called.
//! - [`UpdateSystem`]s run every tick, in registration order.
//! - [`ReactiveSystem`]s run every tick after the update systems, and are handed the live
//!   entities that pass their filter. A reactive system with no passing entities is not run.
//!
//! ```rust,ignore
//! struct Gravity;
//!
//! impl UpdateSystem for Gravity {
//!     fn update(&mut self, world: &mut WorldContext, delta_time: f32) -> tiny_ecs::Result<()> {
//!         for id in world.entities_with_all::<Velocity>() {
//!             world.get_component_mut::<Velocity>(id)?.y -= 9.81 * delta_time;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut systems = SystemManager::new(WorldContext::default());
//! systems.register_update_system(Gravity);
//! systems.init()?;
//! systems.update(1.0 / 60.0)?;
//! ```
//!
//! One instance can take part in several phases and keep its state across them. Share it
//! through [`Phases`]:
//!
//! ```rust,ignore
//! let spawner = Rc::new(RefCell::new(Spawner::default()));
//! systems.register_system(Phases::new().init(spawner.clone()).update(spawner))?;
//! ```

mod manager;

use std::{cell::RefCell, fmt, rc::Rc};

use crate::{entity, error::Result, world::WorldContext};

pub use manager::SystemManager;

/// A system identifier, unique within one [`SystemManager`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// Construct a new system Id from a raw u32 value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw identifier value.
    #[inline]
    pub const fn id(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags::bitflags! {
    /// The phases a registered system runs in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Kind: u8 {
        const INIT     = 0b0000_0001;
        const UPDATE   = 0b0000_0010;
        const REACTIVE = 0b0000_0100;
    }
}

/// The phase implementations of one system, registered together under a single id.
///
/// Each phase holds a shared handle, so the same instance can be given to several phases.
#[derive(Default)]
pub struct Phases {
    pub(crate) init: Option<Rc<RefCell<dyn InitSystem>>>,
    pub(crate) update: Option<Rc<RefCell<dyn UpdateSystem>>>,
    pub(crate) reactive: Option<Rc<RefCell<dyn ReactiveSystem>>>,
}

impl Phases {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `system` in the init phase.
    pub fn init<S: InitSystem>(mut self, system: Rc<RefCell<S>>) -> Self {
        self.init = Some(system as Rc<RefCell<dyn InitSystem>>);
        self
    }

    /// Run `system` in the update phase.
    pub fn update<S: UpdateSystem>(mut self, system: Rc<RefCell<S>>) -> Self {
        self.update = Some(system as Rc<RefCell<dyn UpdateSystem>>);
        self
    }

    /// Run `system` in the reactive phase.
    pub fn reactive<S: ReactiveSystem>(mut self, system: Rc<RefCell<S>>) -> Self {
        self.reactive = Some(system as Rc<RefCell<dyn ReactiveSystem>>);
        self
    }

    /// The phases that have an implementation.
    pub fn kind(&self) -> Kind {
        let mut kind = Kind::empty();
        kind.set(Kind::INIT, self.init.is_some());
        kind.set(Kind::UPDATE, self.update.is_some());
        kind.set(Kind::REACTIVE, self.reactive.is_some());
        kind
    }
}

/// Runs once when the world is initialized.
pub trait InitSystem: 'static {
    fn init(&mut self, world: &mut WorldContext) -> Result<()>;
}

/// Runs once per tick.
pub trait UpdateSystem: 'static {
    fn update(&mut self, world: &mut WorldContext, delta_time: f32) -> Result<()>;
}

/// Runs once per tick over the live entities its filter accepts.
pub trait ReactiveSystem: 'static {
    /// Whether the entity should be handed to [`update`](Self::update) this tick.
    fn filter(&self, entity: &entity::Ref<'_>) -> bool;

    /// Handle the entities that passed the filter, in id order. Never called with an empty
    /// slice.
    fn update(
        &mut self,
        world: &mut WorldContext,
        entities: &[entity::Id],
        delta_time: f32,
    ) -> Result<()>;
}
