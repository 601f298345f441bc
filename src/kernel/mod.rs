//! Kernel lifecycle: a coarse-grained, branching consumer of the engine.
//!
//! Where the request pipeline is strictly linear, the kernel's boot
//! finalization branches: a guard listener that detects a failed boot
//! redirects the `finalize` action down the `failed` path. A veto is a
//! valid outcome here; the kernel simply stops advancing.

use crate::core::{State, Subject, TransitionLog, TransitionRecord};
use crate::machine::{ApplyError, ApplyOutcome, StateMachine};
use crate::state_space;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;

state_space! {
    /// The application kernel's coarse lifecycle.
    pub enum KernelState {
        Created => [boot -> Booting],
        Booting => [finalize -> { to: Ready, failed: Failed }],
        Ready => [shutdown -> Stopped],
        Failed => [],
        Stopped => [],
    }
}

struct KernelInner {
    state: Mutex<KernelState>,
    log: Mutex<TransitionLog<KernelState>>,
}

/// The kernel subject: a process-lifetime shared handle.
#[derive(Clone)]
pub struct Kernel {
    inner: Arc<KernelInner>,
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel {
    /// A fresh kernel in `Created`.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(KernelInner {
                state: Mutex::new(KernelState::Created),
                log: Mutex::new(TransitionLog::new()),
            }),
        }
    }

    /// Snapshot of the lifecycle log so far.
    pub fn log(&self) -> TransitionLog<KernelState> {
        self.inner.log.lock().clone()
    }

    /// Advance one step along the single available affordance.
    ///
    /// Returns the apply outcome, or `None` when the kernel is in a
    /// terminal state. Unlike the request pipeline, a veto is reported
    /// as-is rather than promoted to an error.
    pub fn advance(
        &self,
        machine: &StateMachine<KernelState>,
    ) -> Result<Option<ApplyOutcome<KernelState>>, ApplyError> {
        let affordances = machine.affordances_of(self);
        let Some(affordance) = affordances.first() else {
            return Ok(None);
        };

        let outcome = machine.apply(self, &affordance.action)?;
        if let ApplyOutcome::Transitioned { from, to, path } = &outcome {
            let mut log = self.inner.log.lock();
            *log = log.record(TransitionRecord {
                from: from.clone(),
                to: to.clone(),
                action: affordance.action.clone(),
                path: path.clone(),
                timestamp: Utc::now(),
            });
        }
        Ok(Some(outcome))
    }

    /// Drive the kernel until it reaches a terminal state or a guard vetoes
    /// a step. Returns the state the kernel settled in.
    pub fn run(&self, machine: &StateMachine<KernelState>) -> Result<KernelState, ApplyError> {
        loop {
            match self.advance(machine)? {
                Some(ApplyOutcome::Transitioned { to, .. }) => {
                    log::debug!("kernel entered '{}'", to.name());
                }
                Some(ApplyOutcome::Vetoed { state, action }) => {
                    log::debug!("kernel '{action}' vetoed in '{}'", state.name());
                    return Ok(state);
                }
                None => return Ok(self.current_state()),
            }
        }
    }
}

impl Subject<KernelState> for Kernel {
    fn current_state(&self) -> KernelState {
        self.inner.state.lock().clone()
    }

    fn apply_state(&self, next: KernelState) {
        *self.inner.state.lock() = next;
    }
}
