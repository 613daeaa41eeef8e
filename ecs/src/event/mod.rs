//! Synchronous, type-keyed publish/subscribe.
//!
//! Listeners subscribe to one event payload type at a time and are notified in the order they
//! subscribed. Every subscription gets a fresh [`listener::Id`], unique across all event types,
//! which can later be used to unsubscribe or to address a single listener.
//!
//! Listeners are owned by the caller and shared with the [`EventManager`] as
//! `Weak<RefCell<dyn Listener<E>>>`. Dropping the last `Rc` ends delivery without an explicit
//! unsubscribe.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::{cell::RefCell, rc::Rc};
//! use tiny_ecs::{Event, event::{EventManager, Failure, Listener}};
//!
//! #[derive(Event)]
//! struct Damage(u32);
//!
//! #[derive(Default)]
//! struct Log(Vec<u32>);
//!
//! impl Listener<Damage> for Log {
//!     fn on_event(&mut self, event: &Damage) -> Result<(), Failure> {
//!         self.0.push(event.0);
//!         Ok(())
//!     }
//! }
//!
//! let log = Rc::new(RefCell::new(Log::default()));
//! let mut events = EventManager::new();
//! let handle: Rc<RefCell<dyn Listener<Damage>>> = log.clone();
//! let id = events.subscribe(Rc::downgrade(&handle))?;
//!
//! events.notify(&Damage(5))?;
//! events.unsubscribe(id)?;
//! ```

pub mod listener;
mod manager;

pub use listener::Listener;
pub use manager::EventManager;

/// The error type listeners report failures with.
///
/// It is handed back to the caller of [`EventManager::notify`] unchanged inside
/// [`Error::ListenerFailure`](crate::Error::ListenerFailure).
pub type Failure = Box<dyn std::error::Error + Send + Sync>;

/// Marker trait for event payload types. Usually implemented with `#[derive(Event)]`.
pub trait Event: 'static {}
