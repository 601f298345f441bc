//! Core State trait for state-space members.
//!
//! Every state space is a closed, named set of values. Each member carries
//! its declared outgoing transitions as static metadata, which the
//! transition table reads once at registration time.

use super::transition::Transition;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for members of a state space.
///
/// States are identity-comparable values, not objects with behavior. All
/// methods are pure. The declared transitions are metadata only; nothing is
/// enforced until a [`TransitionTable`](crate::machine::TransitionTable) is
/// built from them.
///
/// Most implementations come from the [`state_space!`](crate::state_space)
/// macro rather than being written by hand.
///
/// # Required Traits
///
/// - `Clone` + `Eq` + `Hash`: states are used as table keys
/// - `Debug`: states must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: states appear in serializable records
///
/// # Example
///
/// ```rust
/// use waypoint::core::{State, Transition};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum DoorState {
///     Open,
///     Closed,
/// }
///
/// impl State for DoorState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Open => "Open",
///             Self::Closed => "Closed",
///         }
///     }
///
///     fn variants() -> Vec<Self> {
///         vec![Self::Open, Self::Closed]
///     }
///
///     fn transitions(&self) -> Vec<Transition<Self>> {
///         match self {
///             Self::Open => vec![Transition::to("close", Self::Closed)],
///             Self::Closed => vec![Transition::to("open", Self::Open)],
///         }
///     }
/// }
/// ```
pub trait State:
    Clone + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Get the state's name for display/logging and event-name derivation.
    fn name(&self) -> &str;

    /// Enumerate every member of the state space, in declaration order.
    fn variants() -> Vec<Self>;

    /// The transitions declared on this state.
    ///
    /// Terminal states return an empty list. Declaring two transitions with
    /// the same action on one state is legal; the table keeps the last one.
    fn transitions(&self) -> Vec<Transition<Self>>;

    /// Check if this state declares no outgoing transitions.
    fn is_terminal(&self) -> bool {
        self.transitions().is_empty()
    }
}
