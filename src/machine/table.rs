//! Transition table: the compiled lookup for a state space.

use crate::core::{Affordance, State, Transition, DEFAULT_PATH};
use std::collections::HashMap;

/// Lookup table from `(state, action)` to a declared [`Transition`], built
/// once by scanning the metadata attached to every state in a space.
///
/// The table is expected to be built during a single initialization phase
/// and treated as read-only afterwards; [`resolve`](Self::resolve) and
/// [`affordances_from`](Self::affordances_from) are pure lookups.
///
/// # Example
///
/// ```rust
/// use waypoint::machine::TransitionTable;
/// use waypoint::state_space;
///
/// state_space! {
///     enum DoorState {
///         Open => [close -> Closed],
///         Closed => [open -> Open],
///     }
/// }
///
/// let table = TransitionTable::<DoorState>::from_space();
/// assert!(table.resolve(&DoorState::Open, "close").is_some());
/// assert!(table.resolve(&DoorState::Open, "open").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct TransitionTable<S: State> {
    by_state: HashMap<S, Vec<Transition<S>>>,
}

impl<S: State> Default for TransitionTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> TransitionTable<S> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            by_state: HashMap::new(),
        }
    }

    /// Build a table from the state space's declared metadata.
    pub fn from_space() -> Self {
        let mut table = Self::new();
        table.register_space();
        table
    }

    /// Walk every state in the space and insert its declared transitions.
    ///
    /// Idempotent: re-registering the same space leaves the table unchanged,
    /// because [`insert`](Self::insert) replaces per `(state, action)` key
    /// rather than accumulating.
    pub fn register_space(&mut self) {
        for state in S::variants() {
            for transition in state.transitions() {
                self.insert(state.clone(), transition);
            }
        }
    }

    /// Insert one transition under `(from, action)`.
    ///
    /// A later insert with the same key silently replaces the earlier one;
    /// the replacement is logged at debug level but not treated as an error.
    pub fn insert(&mut self, from: S, transition: Transition<S>) {
        let row = self.by_state.entry(from).or_default();
        match row
            .iter_mut()
            .find(|existing| existing.action() == transition.action())
        {
            Some(existing) => {
                log::debug!(
                    "transition for action '{}' redeclared; keeping the later declaration",
                    transition.action()
                );
                *existing = transition;
            }
            None => row.push(transition),
        }
    }

    /// Look up the transition for `(from, action)`, if declared.
    pub fn resolve(&self, from: &S, action: &str) -> Option<&Transition<S>> {
        self.by_state
            .get(from)?
            .iter()
            .find(|transition| transition.action() == action)
    }

    /// Every affordance available from `from`: one per declared transition,
    /// using its default-path target. Transitions that declare no `"to"`
    /// path have no default resolution and are skipped with a warning.
    pub fn affordances_from(&self, from: &S) -> Vec<Affordance<S>> {
        let Some(row) = self.by_state.get(from) else {
            return Vec::new();
        };

        row.iter()
            .filter_map(|transition| match transition.default_target() {
                Some(target) => Some(Affordance {
                    action: transition.action().to_string(),
                    to: target.clone(),
                }),
                None => {
                    log::warn!(
                        "transition '{}' from '{}' declares no '{DEFAULT_PATH}' path; \
                         omitted from affordances",
                        transition.action(),
                        from.name(),
                    );
                    None
                }
            })
            .collect()
    }

    /// Total number of `(state, action)` entries.
    pub fn len(&self) -> usize {
        self.by_state.values().map(Vec::len).sum()
    }

    /// True if no transitions are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
