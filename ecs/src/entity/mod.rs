//! Entity identity and lifecycle.
//!
//! An entity is nothing more than an [`Id`] plus an optional display name and an alive flag.
//! Component data lives in the [`ComponentManager`](crate::component::ComponentManager); the
//! entity id is only the key into that storage.
//!
//! # Id reuse
//!
//! Ids are dense `u32` values. When an entity is destroyed its id goes into a FIFO reuse pool
//! and [`Allocator::alloc`] hands pooled ids out again, oldest first, before growing the
//! counter. This keeps the id space compact, which in turn keeps the per-type sparse indices
//! and the entity slot vector small:
//!
//! ```rust,ignore
//! let mut allocator = Allocator::new();
//! let a = allocator.alloc(); // 0
//! let b = allocator.alloc(); // 1
//! allocator.free(b);
//! allocator.free(a);
//! assert_eq!(allocator.alloc(), b); // destroyed first, reused first
//! assert_eq!(allocator.alloc(), a);
//! ```
//!
//! There are no generations: an id names whichever entity currently owns the slot. The
//! [`EntityManager`] only frees an id after every component of its previous owner has been
//! purged, so a reused id never observes stale data.

mod manager;
mod reference;

use std::fmt;

use crossbeam::queue::SegQueue;

pub use manager::EntityManager;
pub use reference::{Ref, RefMut};

/// An entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// Construct an entity id from a raw value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw identifier value.
    #[inline]
    pub const fn id(&self) -> u32 {
        self.0
    }

    /// Get the index of this entity if it were to live in indexable storage (e.g. Vec)
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for Id {
    #[inline]
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An entity record: identity only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// The identifier of the entity.
    id: Id,

    /// Optional human readable name.
    name: Option<String>,

    /// Whether the entity is currently alive.
    alive: bool,
}

impl Entity {
    /// Construct a live entity.
    #[inline]
    pub(crate) fn new(id: Id, name: Option<String>) -> Self {
        Self {
            id,
            name,
            alive: true,
        }
    }

    /// Get the id of this entity.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the display name of this entity, if one was given.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether this entity is alive.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Mark the entity dead and drop its name.
    #[inline]
    pub(crate) fn kill(&mut self) {
        self.alive = false;
        self.name = None;
    }
}

/// Allocates entity ids and recycles freed ones.
///
/// Freed ids are reused in FIFO order: the id freed earliest is handed out first.
#[derive(Default, Debug)]
pub struct Allocator {
    /// Ids available for reuse, in the order they were freed.
    dead_pool: SegQueue<Id>,

    /// Next fresh id to allocate. Also the number of ids ever allocated.
    next_id: u32,
}

impl Allocator {
    /// Construct a new entity allocator starting from id 0.
    #[inline]
    pub const fn new() -> Self {
        Self {
            dead_pool: SegQueue::new(),
            next_id: 0,
        }
    }

    /// Allocate an id, reusing the oldest freed id if one is available.
    ///
    /// # Panics
    ///
    /// Panics if the pool is empty and all `u32::MAX` fresh ids have been handed out.
    pub fn alloc(&mut self) -> Id {
        if let Some(id) = self.dead_pool.pop() {
            return id;
        }

        let Some(next_id) = self.next_id.checked_add(1) else {
            panic!("Entity id space exhausted");
        };
        let id = Id(self.next_id);
        self.next_id = next_id;
        id
    }

    /// Return an id to the reuse pool.
    ///
    /// The caller is responsible for freeing each id at most once per allocation.
    pub fn free(&mut self, id: Id) {
        debug_assert!(id.0 < self.next_id, "freeing an id that was never allocated");
        self.dead_pool.push(id);
    }

    /// The number of ids waiting in the reuse pool.
    #[inline]
    pub fn reusable(&self) -> usize {
        self.dead_pool.len()
    }

    /// The number of distinct ids handed out so far.
    #[inline]
    pub fn allocated(&self) -> usize {
        self.next_id as usize
    }
}
