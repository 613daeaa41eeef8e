//! Error type shared by every manager in the crate.

use std::error::Error as StdError;

use crate::{entity, event, system};

/// Convenience result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the ECS runtime.
///
/// Routine absence (destroying a dead entity, notifying an event nobody listens to) is not an
/// error and is reported through `bool` / no-op returns instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A caller passed an argument the operation cannot accept.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The entity id is unknown or no longer alive.
    #[error("entity not found: {0}")]
    EntityNotFound(entity::Id),

    /// The entity is alive but the requested component type is not attached to it.
    #[error("component `{component}` not attached to entity {entity}")]
    ComponentNotFound {
        /// The entity that was queried.
        entity: entity::Id,
        /// The Rust type name of the missing component.
        component: &'static str,
    },

    /// The listener id was never issued or has already been unsubscribed.
    #[error("listener does not exist: {0}")]
    ListenerNotFound(event::listener::Id),

    /// The system id was never issued or has already been unregistered.
    #[error("system does not exist: {0}")]
    SystemNotFound(system::Id),

    /// The system is already borrowed, typically because it is running and re-entered itself
    /// through a shared handle.
    #[error("system is busy: {0}")]
    SystemBusy(system::Id),

    /// A listener failed while handling an event. The listener's own error is carried
    /// unchanged, so its message is the message of this error.
    #[error("{0}")]
    ListenerFailure(event::Failure),
}

impl Error {
    /// The listener's original error, if this is a [`Error::ListenerFailure`].
    ///
    /// The returned value can be downcast to the concrete error type the listener produced.
    pub fn listener_failure(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Error::ListenerFailure(failure) => Some(failure.as_ref()),
            _ => None,
        }
    }

    /// Consume the error, returning the listener's original boxed error if there is one.
    pub fn into_listener_failure(self) -> Option<event::Failure> {
        match self {
            Error::ListenerFailure(failure) => Some(failure),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Boom;

    impl std::fmt::Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "boom")
        }
    }

    impl StdError for Boom {}

    #[test]
    fn listener_failure_keeps_message_and_type() {
        // Given
        let error = Error::ListenerFailure(Box::new(Boom));

        // Then
        assert_eq!(error.to_string(), "boom");
        assert!(error.listener_failure().unwrap().downcast_ref::<Boom>().is_some());
        assert!(error.into_listener_failure().unwrap().downcast::<Boom>().is_ok());
    }

    #[test]
    fn other_errors_have_no_listener_failure() {
        let error = Error::EntityNotFound(entity::Id::new(3));

        assert_eq!(error.to_string(), "entity not found: 3");
        assert!(error.listener_failure().is_none());
    }
}
