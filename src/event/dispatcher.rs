//! Event dispatcher: routes events to listeners by name.

use super::event::{BoxError, Event, NamedEvent};
use super::listener::{ListenerFn, ListenerRegistry, DEFAULT_PRIORITY};
use super::subscriber::Subscriber;
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

/// Raised when a listener callback fails; the remainder of the dispatch is
/// aborted and the error propagates to the caller of
/// [`Dispatcher::dispatch`].
#[derive(Debug, Error)]
#[error("listener for '{event}' failed: {source}")]
pub struct DispatchError {
    /// The name of the event being dispatched.
    pub event: String,
    /// The listener's error.
    #[source]
    pub source: BoxError,
}

/// Routes events to registered listeners by event name.
///
/// Listener maps grow monotonically; nothing is unregistered. The expected
/// life cycle is a single-threaded initialization phase that registers
/// every listener, followed by dispatch traffic. Registration methods take
/// `&self` so the dispatcher can be shared behind an `Arc`, and a dispatch
/// snapshots the listener list before running callbacks, so a listener may
/// dispatch a *different* event re-entrantly (the request pipeline does).
/// Re-entering the same listener is not supported.
///
/// # Example
///
/// ```rust
/// use waypoint::event::{Dispatcher, Event, NamedEvent, Propagation};
/// use std::any::Any;
/// use std::borrow::Cow;
///
/// struct Greeting {
///     who: String,
///     propagation: Propagation,
/// }
///
/// impl Event for Greeting {
///     fn name(&self) -> Cow<'_, str> { Cow::Borrowed(Self::NAME) }
///     fn propagation(&self) -> &Propagation { &self.propagation }
///     fn propagation_mut(&mut self) -> &mut Propagation { &mut self.propagation }
///     fn as_any(&self) -> &dyn Any { self }
///     fn as_any_mut(&mut self) -> &mut dyn Any { self }
/// }
///
/// impl NamedEvent for Greeting {
///     const NAME: &'static str = "greeting";
/// }
///
/// let dispatcher = Dispatcher::new();
/// dispatcher.on::<Greeting, _>(|event| {
///     event.who = format!("dear {}", event.who);
///     Ok(())
/// });
///
/// let mut event = Greeting { who: "reader".into(), propagation: Propagation::new() };
/// dispatcher.dispatch(&mut event).unwrap();
/// assert_eq!(event.who, "dear reader");
/// ```
#[derive(Default)]
pub struct Dispatcher {
    channels: RwLock<HashMap<String, ListenerRegistry>>,
}

impl Dispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener under an explicit event name with the default
    /// priority (10). Duplicates are legal; both run.
    pub fn add_listener<E, F>(&self, name: impl Into<String>, listener: F)
    where
        E: Event,
        F: FnMut(&mut E) -> Result<(), BoxError> + Send + 'static,
    {
        self.add_listener_with(name, DEFAULT_PRIORITY, listener);
    }

    /// Register a listener under an explicit event name and priority.
    /// Higher priorities run first; equal priorities run in registration
    /// order.
    pub fn add_listener_with<E, F>(&self, name: impl Into<String>, priority: i32, mut listener: F)
    where
        E: Event,
        F: FnMut(&mut E) -> Result<(), BoxError> + Send + 'static,
    {
        let name = name.into();
        let channel = name.clone();
        let callback: ListenerFn = Box::new(move |event: &mut dyn Event| {
            match event.as_any_mut().downcast_mut::<E>() {
                Some(typed) => listener(typed),
                None => {
                    log::warn!("listener on '{channel}' ignored event with unexpected payload type");
                    Ok(())
                }
            }
        });

        self.channels
            .write()
            .entry(name)
            .or_default()
            .insert(priority, callback);
    }

    /// Register a listener for a named event type, under
    /// [`NamedEvent::NAME`], with the default priority.
    pub fn on<E, F>(&self, listener: F)
    where
        E: NamedEvent,
        F: FnMut(&mut E) -> Result<(), BoxError> + Send + 'static,
    {
        self.add_listener(E::NAME, listener);
    }

    /// Register a listener for a named event type with an explicit priority.
    pub fn on_with<E, F>(&self, priority: i32, listener: F)
    where
        E: NamedEvent,
        F: FnMut(&mut E) -> Result<(), BoxError> + Send + 'static,
    {
        self.add_listener_with(E::NAME, priority, listener);
    }

    /// Let a subscriber object register its own handlers.
    pub fn add_subscriber<S: Subscriber>(&self, subscriber: S) {
        subscriber.subscribe(self);
    }

    /// Number of listeners registered under a name.
    pub fn listener_count(&self, name: &str) -> usize {
        self.channels
            .read()
            .get(name)
            .map(|registry| registry.len())
            .unwrap_or(0)
    }

    /// Dispatch an event to every listener registered under its name.
    ///
    /// Listeners run in descending priority order, registration order within
    /// a bucket. Propagation is checked before each listener; once stopped,
    /// no further listener runs. Dispatching with no registered listeners is
    /// a no-op. The first listener error aborts the rest of the dispatch and
    /// propagates.
    pub fn dispatch<E: Event>(&self, event: &mut E) -> Result<(), DispatchError> {
        let name = event.name().into_owned();
        let snapshot = {
            let channels = self.channels.read();
            match channels.get(&name) {
                Some(registry) => registry.snapshot(),
                None => return Ok(()),
            }
        };

        log::trace!("dispatching '{name}' to {} listener(s)", snapshot.len());

        for entry in snapshot {
            if event.is_propagation_stopped() {
                log::trace!("propagation of '{name}' stopped");
                break;
            }
            let mut callback = entry.callback.lock();
            (*callback)(event).map_err(|source| DispatchError {
                event: name.clone(),
                source,
            })?;
        }

        Ok(())
    }
}
