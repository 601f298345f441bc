//! Event dispatch: named events, priority-ordered listeners, subscribers.
//!
//! Events are strongly typed payloads routed by name. Listeners run in
//! descending priority order (registration order within a bucket) and may
//! stop propagation or rewrite the payload in place. Subscribers bundle
//! related handlers behind one registration call.

mod dispatcher;
mod event;
mod listener;
mod subscriber;

pub use dispatcher::{DispatchError, Dispatcher};
pub use event::{BoxError, Event, NamedEvent, Propagation};
pub use listener::DEFAULT_PRIORITY;
pub use subscriber::Subscriber;
