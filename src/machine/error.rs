//! Errors raised while applying an action.

use crate::core::UnknownPath;
use crate::event::DispatchError;
use thiserror::Error;

/// Errors from [`StateMachine::apply`](crate::machine::StateMachine::apply).
///
/// Table and path errors are programmer or configuration errors: the caller
/// invoked an action the table does not support, or a guard listener
/// selected a path the transition does not declare. Neither is retried.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// The table holds no entry for `(from, action)`. The subject is left
    /// unchanged.
    #[error("no transition from state '{from}' for action '{action}'")]
    NoSuchTransition {
        /// The subject's state at the time of the call.
        from: String,
        /// The action that was requested.
        action: String,
    },

    /// A path name was resolved that the transition does not declare.
    #[error(transparent)]
    Path(#[from] UnknownPath),

    /// A guard or after listener failed; the error propagates unchanged.
    #[error(transparent)]
    Listener(#[from] DispatchError),
}
