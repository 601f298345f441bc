//! Stateful subjects driven by a state machine.

use super::state::State;

/// Any entity exposing a current state and accepting state mutations.
///
/// The engine never constructs or destroys subjects; they are owned by
/// their driver (the request pipeline owns one request subject per call,
/// the kernel owns itself for the process lifetime).
///
/// Subjects are cheap shared handles: transition events carry a clone of
/// the subject so that guard and after listeners can reach it, which is why
/// `apply_state` takes `&self` and implementations use interior mutability
/// (an `Arc` around a `parking_lot` lock in the in-tree subjects).
pub trait Subject<S: State>: Clone + Send + 'static {
    /// The subject's current state.
    fn current_state(&self) -> S;

    /// Commit a state mutation. Called by
    /// [`StateMachine::apply`](crate::machine::StateMachine::apply) after the
    /// guard event has run without a veto.
    fn apply_state(&self, next: S);
}
