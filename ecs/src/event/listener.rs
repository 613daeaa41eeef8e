use std::fmt;

use crate::event::{Event, Failure};

/// Identifies one subscription in an [`EventManager`](crate::event::EventManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
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

/// Handles events of type `E`.
///
/// A type that listens to several events implements this trait once per event type and is
/// subscribed once per type.
pub trait Listener<E: Event> {
    /// Handle an event. An error aborts the current notify call and is returned to its caller.
    fn on_event(&mut self, event: &E) -> Result<(), Failure>;
}
