//! Transition guard and after events.

use crate::core::{State, Subject, DEFAULT_PATH};
use crate::event::{Event, Propagation};
use std::any::Any;
use std::borrow::Cow;

/// Derive the guard event name for `(state, action)`.
///
/// The guard fires before the state mutation is committed; stopping its
/// propagation vetoes the transition. The `.guard`/`.after` suffix pair
/// keeps guard names, after names, and other actions' names disjoint for
/// the same `(state, action)`.
pub fn guard_event_name(state: &str, action: &str) -> String {
    format!("{state}.{action}.guard")
}

/// Derive the after event name for `(state, action)`.
///
/// The after event fires once the mutation is committed and reports the
/// real outcome.
pub fn after_event_name(state: &str, action: &str) -> String {
    format!("{state}.{action}.after")
}

/// Event dispatched around a state transition.
///
/// The guard variant carries the provisional default-path target in `to`
/// and a mutable `path` a listener may rewrite to redirect the outcome of a
/// branching transition. The after variant carries the state actually
/// entered and the path it was reached through.
pub struct TransitionEvent<S: State, T: Subject<S>> {
    name: String,
    /// The state the subject is transitioning from.
    pub from: S,
    /// Guard: the provisional default-path target. After: the state entered.
    pub to: S,
    /// The action being applied.
    pub action: String,
    /// The branch name the transition will resolve through. Guard listeners
    /// redirect by writing a different declared path name; rewrites after
    /// the mutation (in after listeners) have no effect.
    pub path: String,
    /// Handle to the subject being transitioned.
    pub subject: T,
    propagation: Propagation,
}

impl<S: State, T: Subject<S>> TransitionEvent<S, T> {
    pub(crate) fn guard(from: S, provisional: S, action: &str, subject: T) -> Self {
        Self {
            name: guard_event_name(from.name(), action),
            from,
            to: provisional,
            action: action.to_string(),
            path: DEFAULT_PATH.to_string(),
            subject,
            propagation: Propagation::new(),
        }
    }

    pub(crate) fn after(from: S, entered: S, action: &str, path: String, subject: T) -> Self {
        Self {
            name: after_event_name(from.name(), action),
            from,
            to: entered,
            action: action.to_string(),
            path,
            subject,
            propagation: Propagation::new(),
        }
    }
}

impl<S: State, T: Subject<S>> Event for TransitionEvent<S, T> {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.name.as_str())
    }

    fn propagation(&self) -> &Propagation {
        &self.propagation
    }

    fn propagation_mut(&mut self) -> &mut Propagation {
        &mut self.propagation
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
