//! Event trait and propagation control.
//!
//! Events are strongly typed payloads with a name and a stoppable
//! propagation flag. There is no untyped property bag; each event family is
//! its own struct and listeners downcast to the concrete type they
//! registered for.

use std::any::Any;
use std::borrow::Cow;

/// Boxed error type carried by listener callbacks and adapter seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Propagation state of an in-flight event.
///
/// Stopping is monotonic: once stopped, propagation cannot be resumed
/// within the same dispatch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Propagation {
    stopped: bool,
}

impl Propagation {
    /// A fresh, not-yet-stopped propagation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop propagation. Idempotent.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Whether propagation has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

/// A named, mutable, stoppable message.
///
/// The dispatcher routes events by [`name`](Event::name) and checks
/// [`is_propagation_stopped`](Event::is_propagation_stopped) before invoking
/// each listener. Concrete event types expose their payload as plain struct
/// fields; listeners registered through
/// [`Dispatcher::add_listener`](crate::event::Dispatcher::add_listener) or
/// [`Dispatcher::on`](crate::event::Dispatcher::on) receive the concrete
/// type, not `dyn Event`.
pub trait Event: Any {
    /// The name this event dispatches under.
    fn name(&self) -> Cow<'_, str>;

    /// Read access to the propagation flag.
    fn propagation(&self) -> &Propagation;

    /// Write access to the propagation flag.
    fn propagation_mut(&mut self) -> &mut Propagation;

    /// Upcast for listener-side downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for listener-side downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Stop propagation: no further listener runs in the current dispatch.
    fn stop_propagation(&mut self) {
        self.propagation_mut().stop();
    }

    /// Whether propagation has been stopped.
    fn is_propagation_stopped(&self) -> bool {
        self.propagation().is_stopped()
    }
}

/// An event type with a fixed, statically known name.
///
/// Named events register by type: `dispatcher.on::<MyEvent>(..)` subscribes
/// under [`NAME`](NamedEvent::NAME) without a string at the call site.
/// Dynamically named events (transition guard/after events, whose names
/// derive from state and action) implement only [`Event`] and require an
/// explicit name at registration.
pub trait NamedEvent: Event {
    /// The event name instances of this type dispatch under.
    const NAME: &'static str;
}
