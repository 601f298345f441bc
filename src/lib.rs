//! Waypoint: a declarative state machine engine with event-driven guards
//!
//! Waypoint drives stateful subjects through closed state spaces declared as
//! metadata. Transitions are compiled once into a lookup table; applying an
//! action dispatches a cancelable, redirectable guard event before the
//! mutation and an after event once it is committed. Affordance discovery
//! lets drivers ask "what can happen next" instead of hard-coding a state
//! space.
//!
//! # Core Concepts
//!
//! - **State space**: a closed set of states, each carrying its declared
//!   transitions ([`state_space!`])
//! - **Guard event**: dispatched before the mutation; listeners may veto
//!   (stop propagation) or redirect a branching transition to another path
//! - **After event**: dispatched after the mutation, reporting the real
//!   outcome
//! - **Affordance**: a legally invokable `(action, resulting state)` pair
//!   derived from the current state
//!
//! # Example
//!
//! ```rust
//! use waypoint::core::Subject;
//! use waypoint::machine::{StateMachine, TransitionTable};
//! use waypoint::state_space;
//! use parking_lot::Mutex;
//! use std::sync::Arc;
//!
//! state_space! {
//!     pub enum DoorState {
//!         Open => [close -> Closed],
//!         Closed => [open -> Open, lock -> Locked],
//!         Locked => [unlock -> Closed],
//!     }
//! }
//!
//! #[derive(Clone)]
//! struct Door(Arc<Mutex<DoorState>>);
//!
//! impl Subject<DoorState> for Door {
//!     fn current_state(&self) -> DoorState {
//!         self.0.lock().clone()
//!     }
//!     fn apply_state(&self, next: DoorState) {
//!         *self.0.lock() = next;
//!     }
//! }
//!
//! let machine = StateMachine::new(TransitionTable::from_space());
//! let door = Door(Arc::new(Mutex::new(DoorState::Open)));
//!
//! machine.apply(&door, "close").unwrap();
//! machine.apply(&door, "lock").unwrap();
//! assert_eq!(door.current_state(), DoorState::Locked);
//!
//! // Terminal for this session: the only way out of Locked is unlock.
//! let affordances = machine.affordances_of(&door);
//! assert_eq!(affordances.len(), 1);
//! assert_eq!(affordances[0].action, "unlock");
//! ```
//!
//! The [`pipeline`] module is the bundled consumer: a linear per-request
//! lifecycle whose stages hang off guard events, with a typed
//! [`RouteInvoked`](pipeline::RouteInvoked) extensibility point. The
//! [`kernel`] module is a second, branching consumer.

pub mod core;
pub mod event;
pub mod kernel;
pub mod machine;
pub mod pipeline;

// Re-export commonly used types
pub use crate::core::{Affordance, State, Subject, Transition, UnknownPath, DEFAULT_PATH};
pub use event::{Dispatcher, Event, NamedEvent, Subscriber};
pub use machine::{ApplyError, ApplyOutcome, StateMachine, TransitionTable};
