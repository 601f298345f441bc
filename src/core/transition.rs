//! Declarative transition metadata.
//!
//! A transition names an action and maps one or more path names to target
//! states. A single-target transition stores its target under the default
//! path `"to"`; a branching transition stores every named path. Guard
//! listeners redirect an outcome by selecting a different path name before
//! the state mutation is committed.

use super::state::State;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The path name a single-target transition stores its target under, and
/// the path every guard event starts out on.
pub const DEFAULT_PATH: &str = "to";

/// Raised when a path name is resolved that the transition does not declare.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no path named '{path}' declared on action '{action}'")]
pub struct UnknownPath {
    /// The action whose transition was being resolved.
    pub action: String,
    /// The path name that was requested.
    pub path: String,
}

/// A declared transition: an action plus its named target paths.
///
/// # Example
///
/// ```rust
/// use waypoint::core::{Transition, DEFAULT_PATH};
/// use waypoint::state_space;
///
/// state_space! {
///     enum ReviewState {
///         Pending => [review -> { to: Approved, reject: Rejected }],
///         Approved => [],
///         Rejected => [],
///     }
/// }
///
/// let transition = Transition::branching(
///     "review",
///     [("to", ReviewState::Approved), ("reject", ReviewState::Rejected)],
/// );
///
/// assert_eq!(transition.resolve(DEFAULT_PATH).unwrap(), ReviewState::Approved);
/// assert_eq!(transition.resolve("reject").unwrap(), ReviewState::Rejected);
/// assert!(transition.resolve("escalate").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition<S: State> {
    action: String,
    targets: Vec<(String, S)>,
}

impl<S: State> Transition<S> {
    /// Declare a single-target transition. The target is stored under the
    /// default path `"to"`.
    pub fn to(action: impl Into<String>, target: S) -> Self {
        Self {
            action: action.into(),
            targets: vec![(DEFAULT_PATH.to_string(), target)],
        }
    }

    /// Declare a branching transition with explicitly named paths.
    pub fn branching<P, I>(action: impl Into<String>, targets: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = (P, S)>,
    {
        Self {
            action: action.into(),
            targets: targets
                .into_iter()
                .map(|(path, target)| (path.into(), target))
                .collect(),
        }
    }

    /// The action name this transition responds to.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Resolve a path name to its target state.
    ///
    /// A single-target transition only resolves `"to"`; a branching
    /// transition resolves each declared name. Anything else fails with
    /// [`UnknownPath`].
    pub fn resolve(&self, path: &str) -> Result<S, UnknownPath> {
        self.targets
            .iter()
            .find(|(name, _)| name == path)
            .map(|(_, target)| target.clone())
            .ok_or_else(|| UnknownPath {
                action: self.action.clone(),
                path: path.to_string(),
            })
    }

    /// The default-path target, if this transition declares one.
    pub fn default_target(&self) -> Option<&S> {
        self.targets
            .iter()
            .find(|(name, _)| name == DEFAULT_PATH)
            .map(|(_, target)| target)
    }

    /// Iterate over the declared `(path, target)` pairs in declaration order.
    pub fn paths(&self) -> impl Iterator<Item = (&str, &S)> {
        self.targets
            .iter()
            .map(|(name, target)| (name.as_str(), target))
    }
}

/// A legally invokable `(action, resulting state)` pair derived from the
/// transition table for some current state, using the transition's
/// default-path target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Affordance<S: State> {
    /// The action that may be applied.
    pub action: String,
    /// The state the default path leads to.
    pub to: S,
}
