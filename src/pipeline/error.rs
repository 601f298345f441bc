//! Errors specific to the linear request pipeline.

use crate::machine::ApplyError;
use thiserror::Error;

/// Failures of the request pipeline's driver loop.
///
/// `Ambiguous` and `Stalled` are invariants of this particular consumer:
/// branching and vetoes are valid outcomes of the generic engine, but every
/// stage of the linear pipeline is mandatory and has no skip semantics.
/// All variants are unrecoverable for the request being processed; the
/// adapter surfaces them as a 5xx-equivalent outcome.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// More than one affordance exists from the current state.
    #[error("ambiguous affordances: {count} actions available from state '{state}'")]
    Ambiguous {
        /// The state exposing multiple affordances.
        state: String,
        /// How many actions were available.
        count: usize,
    },

    /// A guard vetoed a mandatory stage and the state did not advance.
    #[error("transition '{action}' from state '{state}' was vetoed; pipeline stages are mandatory")]
    Stalled {
        /// The state the request is stuck in.
        state: String,
        /// The vetoed action.
        action: String,
    },

    /// The pipeline reached its terminal state without an outgoing response.
    #[error("pipeline completed without producing an outgoing response")]
    NoResponse,

    /// A table, path, or listener error from the underlying machine.
    #[error(transparent)]
    Apply(#[from] ApplyError),
}
