//! Subscriber objects that register their own handlers.

use super::dispatcher::Dispatcher;

/// An object that knows how to wire its handlers into a dispatcher.
///
/// Typed handlers go through [`Dispatcher::on`], which derives the event
/// name from the payload type; handlers for dynamically named events
/// (transition guard/after events) use
/// [`Dispatcher::add_listener`](Dispatcher::add_listener) with an explicit
/// name. [`Dispatcher::add_subscriber`] hands the dispatcher to
/// `subscribe`.
pub trait Subscriber {
    /// Register this subscriber's handlers.
    fn subscribe(self, events: &Dispatcher);
}
