use std::{
    any::{Any, TypeId, type_name},
    cell::RefCell,
    collections::HashMap,
    rc::Weak,
};

use log::{debug, trace, warn};

use crate::{
    error::{Error, Result},
    event::{Event, Listener, listener},
};

/// Delivers one event to one listener, with the event type erased.
trait ErasedHandler {
    /// Deliver the event. Returns `Ok(false)` when the listener could not be reached.
    fn deliver(&self, event: &dyn Any) -> Result<bool>;

    /// Whether the listener still exists.
    fn is_live(&self) -> bool;
}

/// The typed half of a subscription.
struct Handler<E: Event> {
    listener: Weak<RefCell<dyn Listener<E>>>,
}

impl<E: Event> ErasedHandler for Handler<E> {
    fn deliver(&self, event: &dyn Any) -> Result<bool> {
        let Some(event) = event.downcast_ref::<E>() else {
            return Ok(false);
        };
        let Some(listener) = self.listener.upgrade() else {
            return Ok(false);
        };
        let Ok(mut listener) = listener.try_borrow_mut() else {
            warn!(
                "Skipping listener already handling an event while notifying {}",
                type_name::<E>()
            );
            return Ok(false);
        };

        listener.on_event(event).map_err(Error::ListenerFailure)?;
        Ok(true)
    }

    #[inline]
    fn is_live(&self) -> bool {
        self.listener.strong_count() > 0
    }
}

/// A single subscription.
struct Registration {
    id: listener::Id,

    /// The event type the listener subscribed to.
    event_type: TypeId,

    handler: Box<dyn ErasedHandler>,
}

impl Registration {
    /// Deliver the event if it is the type this registration was made for.
    fn deliver<E: Event>(&self, event: &E) -> Result<()> {
        if self.event_type != TypeId::of::<E>() {
            return Ok(());
        }

        if !self.handler.deliver(event)? {
            trace!("Listener {} is gone, skipped", self.id);
        }
        Ok(())
    }
}

/// Type-keyed registry of event listeners.
///
/// Listeners for each event type are kept in subscription order, and that is the order they
/// are notified in. Listener ids are never reused while the manager lives.
#[derive(Default)]
pub struct EventManager {
    /// Subscriptions per event type, in subscription order.
    registrations: HashMap<TypeId, Vec<Registration>>,

    /// Event type of every live subscription.
    owners: HashMap<listener::Id, TypeId>,

    /// Next listener id to hand out.
    next_id: u32,
}

impl EventManager {
    /// Create a manager without listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a listener to events of type `E`.
    ///
    /// The manager only keeps a weak handle; the caller owns the listener. Subscribing the same
    /// listener again yields a new, distinct id and a second delivery per notify. Registrations
    /// of listeners that have since been dropped are released first.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the handle no longer points at a listener, or if listener
    /// ids are exhausted.
    pub fn subscribe<E: Event>(
        &mut self,
        listener: Weak<RefCell<dyn Listener<E>>>,
    ) -> Result<listener::Id> {
        if listener.strong_count() == 0 {
            return Err(Error::InvalidArgument("listener has already been dropped"));
        }

        let next_id = self
            .next_id
            .checked_add(1)
            .ok_or(Error::InvalidArgument("listener ids exhausted"))?;
        self.remove_dropped();

        let id = listener::Id::new(self.next_id);
        self.next_id = next_id;

        let event_type = TypeId::of::<E>();
        self.registrations
            .entry(event_type)
            .or_default()
            .push(Registration {
                id,
                event_type,
                handler: Box::new(Handler { listener }),
            });
        self.owners.insert(id, event_type);

        debug!("Subscribed listener {id} to {}", type_name::<E>());
        Ok(id)
    }

    /// Remove a subscription. Other subscriptions, including ones of the same listener, are
    /// unaffected.
    ///
    /// # Errors
    ///
    /// [`Error::ListenerNotFound`] if the id was never issued or was already unsubscribed.
    pub fn unsubscribe(&mut self, id: listener::Id) -> Result<()> {
        let event_type = self.owners.remove(&id).ok_or(Error::ListenerNotFound(id))?;

        if let Some(registrations) = self.registrations.get_mut(&event_type) {
            registrations.retain(|registration| registration.id != id);
            if registrations.is_empty() {
                self.registrations.remove(&event_type);
            }
        }

        debug!("Unsubscribed listener {id}");
        Ok(())
    }

    /// Release the subscriptions of listeners that have been dropped, returning how many were
    /// released.
    pub fn remove_dropped(&mut self) -> usize {
        let mut released = Vec::new();
        self.registrations.retain(|_, registrations| {
            registrations.retain(|registration| {
                let live = registration.handler.is_live();
                if !live {
                    released.push(registration.id);
                }
                live
            });
            !registrations.is_empty()
        });

        for id in &released {
            self.owners.remove(id);
        }
        if !released.is_empty() {
            debug!("Released {} dropped listener(s)", released.len());
        }
        released.len()
    }

    /// Deliver an event to every listener subscribed to its type, in subscription order.
    ///
    /// Without listeners this does nothing. Listeners that were dropped, or are already busy
    /// handling an event further up the stack, are skipped.
    ///
    /// # Errors
    ///
    /// The first listener failure stops delivery and is returned as
    /// [`Error::ListenerFailure`], carrying the listener's error unchanged.
    pub fn notify<E: Event>(&self, event: &E) -> Result<()> {
        let Some(registrations) = self.registrations.get(&TypeId::of::<E>()) else {
            return Ok(());
        };

        trace!(
            "Notifying {} listener(s) of {}",
            registrations.len(),
            type_name::<E>()
        );
        for registration in registrations {
            registration.deliver(event)?;
        }
        Ok(())
    }

    /// Deliver an event to a single listener.
    ///
    /// Does nothing if the id is unknown or subscribed to a different event type.
    ///
    /// # Errors
    ///
    /// [`Error::ListenerFailure`] if the listener fails.
    pub fn notify_listener<E: Event>(&self, event: &E, id: listener::Id) -> Result<()> {
        let registration = self
            .registrations
            .get(&TypeId::of::<E>())
            .and_then(|registrations| registrations.iter().find(|r| r.id == id));

        match registration {
            Some(registration) => registration.deliver(event),
            None => Ok(()),
        }
    }

    /// Number of live subscriptions across all event types.
    #[inline]
    pub fn num_of_listeners(&self) -> usize {
        self.owners.len()
    }

    /// Number of live subscriptions to events of type `E`.
    pub fn num_of_listeners_for<E: Event>(&self) -> usize {
        self.registrations
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    #[inline]
    pub fn is_subscribed(&self, id: listener::Id) -> bool {
        self.owners.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use std::{fmt, rc::Rc};

    use tiny_ecs_macros::Event;

    use super::*;
    use crate::event::Failure;

    #[derive(Event, Debug, Clone, PartialEq)]
    struct Ping(u32);

    #[derive(Event, Debug)]
    struct Pong;

    /// Records every `Ping` it receives.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<u32>,
    }

    impl Listener<Ping> for Recorder {
        fn on_event(&mut self, event: &Ping) -> std::result::Result<(), Failure> {
            self.seen.push(event.0);
            Ok(())
        }
    }

    /// Only understands `Pong`.
    #[derive(Default)]
    struct PongCounter {
        count: usize,
    }

    impl Listener<Pong> for PongCounter {
        fn on_event(&mut self, _event: &Pong) -> std::result::Result<(), Failure> {
            self.count += 1;
            Ok(())
        }
    }

    #[derive(Debug, PartialEq)]
    struct Rejected {
        reason: String,
    }

    impl fmt::Display for Rejected {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "rejected: {}", self.reason)
        }
    }

    impl std::error::Error for Rejected {}

    struct Failing;

    impl Listener<Ping> for Failing {
        fn on_event(&mut self, event: &Ping) -> std::result::Result<(), Failure> {
            Err(Box::new(Rejected {
                reason: format!("ping {}", event.0),
            }))
        }
    }

    fn recorder() -> Rc<RefCell<Recorder>> {
        Rc::new(RefCell::new(Recorder::default()))
    }

    fn ping_handle<L: Listener<Ping> + 'static>(
        listener: &Rc<RefCell<L>>,
    ) -> Weak<RefCell<dyn Listener<Ping>>> {
        let listener: Rc<RefCell<dyn Listener<Ping>>> = listener.clone();
        Rc::downgrade(&listener)
    }

    #[test]
    fn subscribe_dropped_listener_is_invalid() {
        // Given
        let mut events = EventManager::new();
        let handle = ping_handle(&recorder());

        // When - the only Rc was a temporary
        let result = events.subscribe::<Ping>(handle);

        // Then
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert_eq!(events.num_of_listeners(), 0);
    }

    #[test]
    fn subscribing_same_listener_yields_distinct_ids() {
        // Given
        let mut events = EventManager::new();
        let listener = recorder();

        // When
        let ids: Vec<_> = (0..4)
            .map(|_| events.subscribe(ping_handle(&listener)).unwrap())
            .collect();

        // Then
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 4);
        assert_eq!(events.num_of_listeners_for::<Ping>(), 4);
    }

    #[test]
    fn unsubscribe_unknown_id_fails() {
        // Given
        let mut events = EventManager::new();
        let listener = recorder();
        let id = events.subscribe(ping_handle(&listener)).unwrap();

        // Then
        assert!(matches!(
            events.unsubscribe(listener::Id::new(42)),
            Err(Error::ListenerNotFound(_))
        ));
        assert!(events.unsubscribe(id).is_ok());
        assert!(matches!(events.unsubscribe(id), Err(Error::ListenerNotFound(_))));
        assert!(!events.is_subscribed(id));
    }

    #[test]
    fn unsubscribe_leaves_other_registrations() {
        // Given
        let mut events = EventManager::new();
        let listener = recorder();
        let first = events.subscribe(ping_handle(&listener)).unwrap();
        let second = events.subscribe(ping_handle(&listener)).unwrap();

        // When
        events.unsubscribe(first).unwrap();
        events.notify(&Ping(1)).unwrap();

        // Then
        assert!(events.is_subscribed(second));
        assert_eq!(listener.borrow().seen, vec![1]);
    }

    #[test]
    fn notify_without_listeners_is_noop() {
        let events = EventManager::new();

        assert!(events.notify(&Ping(1)).is_ok());
    }

    #[test]
    fn notify_ignores_other_event_types() {
        // Given
        let mut events = EventManager::new();
        let pongs = Rc::new(RefCell::new(PongCounter::default()));
        let handle: Rc<RefCell<dyn Listener<Pong>>> = pongs.clone();
        events.subscribe(Rc::downgrade(&handle)).unwrap();

        // When
        events.notify(&Ping(1)).unwrap();

        // Then
        assert_eq!(pongs.borrow().count, 0);
    }

    #[test]
    fn every_listener_receives_every_notify() {
        // Given
        let mut events = EventManager::new();
        let listeners: Vec<_> = (0..4).map(|_| recorder()).collect();
        for listener in &listeners {
            events.subscribe(ping_handle(listener)).unwrap();
        }

        // When
        for _ in 0..5 {
            events.notify(&Ping(7)).unwrap();
        }

        // Then
        for listener in &listeners {
            assert_eq!(listener.borrow().seen, vec![7; 5]);
        }
    }

    #[test]
    fn notify_listener_reaches_only_target() {
        // Given
        let mut events = EventManager::new();
        let first = recorder();
        let second = recorder();
        events.subscribe(ping_handle(&first)).unwrap();
        let target = events.subscribe(ping_handle(&second)).unwrap();

        // When
        events.notify_listener(&Ping(3), target).unwrap();

        // Then
        assert!(first.borrow().seen.is_empty());
        assert_eq!(second.borrow().seen, vec![3]);
    }

    #[test]
    fn notify_listener_with_wrong_type_or_unknown_id_is_noop() {
        // Given
        let mut events = EventManager::new();
        let listener = recorder();
        let id = events.subscribe(ping_handle(&listener)).unwrap();

        // Then
        assert!(events.notify_listener(&Pong, id).is_ok());
        assert!(events.notify_listener(&Ping(1), listener::Id::new(99)).is_ok());
        assert!(listener.borrow().seen.is_empty());
    }

    #[test]
    fn listener_for_other_type_does_not_block_delivery() {
        // Given - a Pong-only listener subscribed between two Ping listeners
        let mut events = EventManager::new();
        let before = recorder();
        let after = recorder();
        let pongs = Rc::new(RefCell::new(PongCounter::default()));
        let pong_handle: Rc<RefCell<dyn Listener<Pong>>> = pongs.clone();
        events.subscribe(ping_handle(&before)).unwrap();
        events.subscribe(Rc::downgrade(&pong_handle)).unwrap();
        events.subscribe(ping_handle(&after)).unwrap();

        // When
        events.notify(&Ping(2)).unwrap();
        events.notify(&Pong).unwrap();

        // Then
        assert_eq!(before.borrow().seen, vec![2]);
        assert_eq!(after.borrow().seen, vec![2]);
        assert_eq!(pongs.borrow().count, 1);
    }

    #[test]
    fn dropped_and_busy_listeners_are_skipped() {
        // Given
        let mut events = EventManager::new();
        let dropped = recorder();
        let busy = recorder();
        let healthy = recorder();
        let dropped_id = events.subscribe(ping_handle(&dropped)).unwrap();
        events.subscribe(ping_handle(&busy)).unwrap();
        events.subscribe(ping_handle(&healthy)).unwrap();
        drop(dropped);

        // When - `busy` is mutably borrowed, as if it were already mid-dispatch
        let guard = busy.borrow_mut();
        let result = events.notify(&Ping(9));
        drop(guard);

        // Then
        assert!(result.is_ok());
        assert!(busy.borrow().seen.is_empty());
        assert_eq!(healthy.borrow().seen, vec![9]);
        assert!(events.is_subscribed(dropped_id));
    }

    #[test]
    fn listener_failure_reaches_caller_unchanged() {
        // Given
        let mut events = EventManager::new();
        let before = recorder();
        let failing = Rc::new(RefCell::new(Failing));
        let after = recorder();
        events.subscribe(ping_handle(&before)).unwrap();
        events.subscribe(ping_handle(&failing)).unwrap();
        events.subscribe(ping_handle(&after)).unwrap();

        // When
        let error = events.notify(&Ping(4)).unwrap_err();

        // Then - same message, same concrete type
        assert_eq!(error.to_string(), "rejected: ping 4");
        let failure = error.into_listener_failure().unwrap();
        assert_eq!(
            *failure.downcast::<Rejected>().unwrap(),
            Rejected {
                reason: "ping 4".into()
            }
        );

        // Then - delivery stopped at the failing listener
        assert_eq!(before.borrow().seen, vec![4]);
        assert!(after.borrow().seen.is_empty());
    }

    #[test]
    fn dropped_listeners_are_released_on_subscribe() {
        // Given
        let mut events = EventManager::new();
        let dropped = recorder();
        let kept = recorder();
        let dropped_id = events.subscribe(ping_handle(&dropped)).unwrap();
        let kept_id = events.subscribe(ping_handle(&kept)).unwrap();
        drop(dropped);

        // When
        let pongs = Rc::new(RefCell::new(PongCounter::default()));
        let pong_handle: Rc<RefCell<dyn Listener<Pong>>> = pongs.clone();
        events.subscribe(Rc::downgrade(&pong_handle)).unwrap();

        // Then
        assert!(!events.is_subscribed(dropped_id));
        assert!(events.is_subscribed(kept_id));
        assert_eq!(events.num_of_listeners(), 2);
        assert_eq!(events.num_of_listeners_for::<Ping>(), 1);
        assert!(matches!(
            events.unsubscribe(dropped_id),
            Err(Error::ListenerNotFound(_))
        ));
    }

    #[test]
    fn remove_dropped_counts_released_registrations() {
        // Given
        let mut events = EventManager::new();
        let listener = recorder();
        events.subscribe(ping_handle(&listener)).unwrap();
        events.subscribe(ping_handle(&listener)).unwrap();

        // Then
        assert_eq!(events.remove_dropped(), 0);

        // When
        drop(listener);

        // Then
        assert_eq!(events.remove_dropped(), 2);
        assert_eq!(events.num_of_listeners(), 0);
        assert_eq!(events.num_of_listeners_for::<Ping>(), 0);
    }

    #[test]
    fn exhausted_listener_ids_are_an_error() {
        // Given
        let mut events = EventManager::new();
        let listener = recorder();
        events.next_id = u32::MAX;

        // When
        let result = events.subscribe(ping_handle(&listener));

        // Then
        assert!(matches!(result, Err(Error::InvalidArgument("listener ids exhausted"))));
        assert_eq!(events.num_of_listeners(), 0);
    }
}
