use std::{
    cell::{RefCell, RefMut},
    rc::Rc,
};

use log::{debug, info, warn};

use crate::{
    entity,
    error::{Error, Result},
    system::{Id, InitSystem, Kind, Phases, ReactiveSystem, UpdateSystem},
    world::WorldContext,
};

/// A registered system and its phase implementations.
struct Entry {
    id: Id,
    init: Option<Rc<RefCell<dyn InitSystem>>>,
    update: Option<Rc<RefCell<dyn UpdateSystem>>>,
    reactive: Option<Rc<RefCell<dyn ReactiveSystem>>>,
}

impl Entry {
    fn kind(&self) -> Kind {
        let mut kind = Kind::empty();
        kind.set(Kind::INIT, self.init.is_some());
        kind.set(Kind::UPDATE, self.update.is_some());
        kind.set(Kind::REACTIVE, self.reactive.is_some());
        kind
    }
}

/// Owns a world and the systems that run against it.
pub struct SystemManager {
    world: WorldContext,

    /// Registered systems, in registration order.
    systems: Vec<Entry>,

    /// Next system id to hand out.
    next_id: u32,

    /// Whether `init` has been called.
    initialized: bool,
}

impl SystemManager {
    pub fn new(world: WorldContext) -> Self {
        Self {
            world,
            systems: Vec::new(),
            next_id: 0,
            initialized: false,
        }
    }

    #[inline]
    pub fn world(&self) -> &WorldContext {
        &self.world
    }

    #[inline]
    pub fn world_mut(&mut self) -> &mut WorldContext {
        &mut self.world
    }

    /// Whether [`init`](Self::init) has been called.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Register one system for every phase `phases` names. Shared handles let a single
    /// instance keep its state between the phases.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `phases` names no phase or system ids are exhausted.
    pub fn register_system(&mut self, phases: Phases) -> Result<Id> {
        if phases.kind().is_empty() {
            return Err(Error::InvalidArgument("system implements no phase"));
        }
        let next_id = self
            .next_id
            .checked_add(1)
            .ok_or(Error::InvalidArgument("system ids exhausted"))?;
        let id = Id::new(self.next_id);
        self.next_id = next_id;

        let Phases {
            init,
            update,
            reactive,
        } = phases;
        let entry = Entry {
            id,
            init,
            update,
            reactive,
        };
        debug!("Registered {:?} system {id}", entry.kind());
        self.systems.push(entry);
        Ok(id)
    }

    /// # Panics
    ///
    /// Panics if system ids are exhausted.
    pub fn register_init_system(&mut self, system: impl InitSystem) -> Id {
        self.register_single(Phases::new().init(Rc::new(RefCell::new(system))))
    }

    /// # Panics
    ///
    /// Panics if system ids are exhausted.
    pub fn register_update_system(&mut self, system: impl UpdateSystem) -> Id {
        self.register_single(Phases::new().update(Rc::new(RefCell::new(system))))
    }

    /// # Panics
    ///
    /// Panics if system ids are exhausted.
    pub fn register_reactive_system(&mut self, system: impl ReactiveSystem) -> Id {
        self.register_single(Phases::new().reactive(Rc::new(RefCell::new(system))))
    }

    /// Remove a system from every phase it was registered in.
    ///
    /// # Errors
    ///
    /// [`Error::SystemNotFound`] if the id is unknown or already unregistered.
    pub fn unregister_system(&mut self, id: Id) -> Result<()> {
        let position = self
            .systems
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(Error::SystemNotFound(id))?;
        let entry = self.systems.remove(position);

        debug!("Unregistered {:?} system {id}", entry.kind());
        Ok(())
    }

    /// The phases of a registered system.
    pub fn kind_of(&self, id: Id) -> Option<Kind> {
        self.systems
            .iter()
            .find(|entry| entry.id == id)
            .map(Entry::kind)
    }

    /// Registered systems and their phases, in registration order.
    pub fn systems(&self) -> impl Iterator<Item = (Id, Kind)> + '_ {
        self.systems.iter().map(|entry| (entry.id, entry.kind()))
    }

    /// Number of registered systems.
    #[inline]
    pub fn num_of_systems(&self) -> usize {
        self.systems.len()
    }

    /// Run every init system once, in registration order.
    ///
    /// Only the first call runs anything; later calls are logged and ignored, even if init
    /// systems were registered since. The manager counts as initialized once this is called,
    /// also when an init system fails.
    ///
    /// # Errors
    ///
    /// The first failing system's error, or [`Error::SystemBusy`] if a system is already
    /// borrowed through a shared handle.
    pub fn init(&mut self) -> Result<()> {
        if self.initialized {
            warn!("System manager is already initialized, ignoring init");
            return Ok(());
        }
        self.initialized = true;

        let count = self.systems.iter().filter(|entry| entry.init.is_some()).count();
        info!("Initializing {count} init system(s)");
        for entry in &self.systems {
            if let Some(system) = &entry.init {
                let mut system = borrow(entry.id, system)?;
                system.init(&mut self.world)?;
            }
        }
        Ok(())
    }

    /// Run one tick: every update system, then every reactive system with the live entities
    /// that pass its filter.
    ///
    /// # Errors
    ///
    /// The first failing system aborts the tick and its error is returned.
    /// [`Error::SystemBusy`] if a system is already borrowed through a shared handle.
    pub fn update(&mut self, delta_time: f32) -> Result<()> {
        for entry in &self.systems {
            if let Some(system) = &entry.update {
                let mut system = borrow(entry.id, system)?;
                system.update(&mut self.world, delta_time)?;
            }
        }

        for entry in &self.systems {
            if let Some(system) = &entry.reactive {
                let mut system = borrow(entry.id, system)?;
                let passing = reactive_candidates(&self.world, &*system);
                if passing.is_empty() {
                    continue;
                }
                system.update(&mut self.world, &passing, delta_time)?;
            }
        }
        Ok(())
    }

    fn register_single(&mut self, phases: Phases) -> Id {
        match self.register_system(phases) {
            Ok(id) => id,
            Err(error) => panic!("{error}"),
        }
    }
}

fn borrow<S: ?Sized>(id: Id, system: &RefCell<S>) -> Result<RefMut<'_, S>> {
    system.try_borrow_mut().map_err(|_| Error::SystemBusy(id))
}

/// Live entities accepted by the system's filter, in id order.
fn reactive_candidates(world: &WorldContext, system: &dyn ReactiveSystem) -> Vec<entity::Id> {
    world
        .entities()
        .filter_map(|entity| world.entity(entity.id()).ok())
        .filter(|entity| system.filter(entity))
        .map(|entity| entity.id())
        .collect()
}
