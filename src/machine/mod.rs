//! State machine: applies named actions to stateful subjects.
//!
//! `apply` resolves the declared transition, dispatches a cancelable,
//! redirectable guard event, commits the state mutation, and dispatches an
//! after event reporting the real outcome. Affordance discovery exposes the
//! set of legally invokable actions so drivers need not hard-code a state
//! space.

mod error;
mod events;
mod table;

pub use error::ApplyError;
pub use events::{after_event_name, guard_event_name, TransitionEvent};
pub use table::TransitionTable;

use crate::core::{Affordance, State, Subject, DEFAULT_PATH};
use crate::event::{Dispatcher, Event};
use std::sync::Arc;

/// Result of a successful [`StateMachine::apply`] call.
///
/// A veto is a valid outcome of the generic engine, not an error; consumers
/// that treat every stage as mandatory (the request pipeline) promote it to
/// an error themselves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplyOutcome<S: State> {
    /// The transition committed.
    Transitioned {
        /// The state the subject was in.
        from: S,
        /// The state entered, after any guard redirection.
        to: S,
        /// The path the target was resolved through.
        path: String,
    },
    /// A guard listener stopped propagation; the subject is unchanged and
    /// no after event was dispatched.
    Vetoed {
        /// The state the subject remains in.
        state: S,
        /// The action that was vetoed.
        action: String,
    },
}

/// Applies named actions to subjects according to a [`TransitionTable`].
///
/// With a dispatcher attached, every apply emits a guard event (cancelable,
/// redirectable) before mutating and an after event once committed. Without
/// one, applies resolve the default path directly.
///
/// # Example
///
/// ```rust
/// use waypoint::machine::{ApplyOutcome, StateMachine, TransitionTable};
/// use waypoint::core::Subject;
/// use waypoint::state_space;
/// use parking_lot::Mutex;
/// use std::sync::Arc;
///
/// state_space! {
///     pub enum DoorState {
///         Open => [close -> Closed],
///         Closed => [open -> Open],
///     }
/// }
///
/// #[derive(Clone)]
/// struct Door(Arc<Mutex<DoorState>>);
///
/// impl Subject<DoorState> for Door {
///     fn current_state(&self) -> DoorState {
///         self.0.lock().clone()
///     }
///     fn apply_state(&self, next: DoorState) {
///         *self.0.lock() = next;
///     }
/// }
///
/// let machine = StateMachine::new(TransitionTable::from_space());
/// let door = Door(Arc::new(Mutex::new(DoorState::Open)));
///
/// let outcome = machine.apply(&door, "close").unwrap();
/// assert!(matches!(outcome, ApplyOutcome::Transitioned { .. }));
/// assert_eq!(door.current_state(), DoorState::Closed);
/// ```
pub struct StateMachine<S: State> {
    table: TransitionTable<S>,
    events: Option<Arc<Dispatcher>>,
}

impl<S: State> StateMachine<S> {
    /// Create a machine with no dispatcher attached.
    pub fn new(table: TransitionTable<S>) -> Self {
        Self {
            table,
            events: None,
        }
    }

    /// Create a machine that emits guard and after events through the
    /// dispatcher.
    pub fn with_events(table: TransitionTable<S>, events: Arc<Dispatcher>) -> Self {
        Self {
            table,
            events: Some(events),
        }
    }

    /// The compiled transition table.
    pub fn table(&self) -> &TransitionTable<S> {
        &self.table
    }

    /// The attached dispatcher, if any.
    pub fn events(&self) -> Option<&Arc<Dispatcher>> {
        self.events.as_ref()
    }

    /// The affordances available from the subject's current state. An empty
    /// list means the subject is in a terminal state.
    pub fn affordances_of<T: Subject<S>>(&self, subject: &T) -> Vec<Affordance<S>> {
        self.table.affordances_from(&subject.current_state())
    }

    /// Apply a named action to the subject.
    ///
    /// 1. Resolve the transition for `(current state, action)`; fail with
    ///    [`ApplyError::NoSuchTransition`] if the table has no entry.
    /// 2. Dispatch the guard event. A stopped propagation vetoes the
    ///    transition: the subject is untouched and no after event fires.
    /// 3. Resolve the (possibly redirected) path to the actual target and
    ///    commit it with `subject.apply_state`.
    /// 4. Dispatch the after event carrying the real outcome.
    ///
    /// For a fixed `(state, action)` and guard behavior the outcome is
    /// deterministic; the engine introduces no randomness of its own.
    pub fn apply<T: Subject<S>>(
        &self,
        subject: &T,
        action: &str,
    ) -> Result<ApplyOutcome<S>, ApplyError> {
        let from = subject.current_state();
        let transition =
            self.table
                .resolve(&from, action)
                .ok_or_else(|| ApplyError::NoSuchTransition {
                    from: from.name().to_string(),
                    action: action.to_string(),
                })?;

        let provisional = transition.resolve(DEFAULT_PATH)?;

        let (target, path) = match &self.events {
            Some(events) => {
                let mut guard =
                    TransitionEvent::guard(from.clone(), provisional, action, subject.clone());
                events.dispatch(&mut guard)?;

                if guard.is_propagation_stopped() {
                    log::debug!(
                        "transition '{}' from '{}' vetoed by guard",
                        action,
                        from.name()
                    );
                    return Ok(ApplyOutcome::Vetoed {
                        state: from,
                        action: action.to_string(),
                    });
                }

                let path = guard.path;
                (transition.resolve(&path)?, path)
            }
            None => (provisional, DEFAULT_PATH.to_string()),
        };

        subject.apply_state(target.clone());
        log::debug!(
            "transition {} --{}--> {}",
            from.name(),
            action,
            target.name()
        );

        if let Some(events) = &self.events {
            let mut after = TransitionEvent::after(
                from.clone(),
                target.clone(),
                action,
                path.clone(),
                subject.clone(),
            );
            events.dispatch(&mut after)?;
        }

        Ok(ApplyOutcome::Transitioned {
            from,
            to: target,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::state_space;
    use parking_lot::Mutex;
    use std::sync::Arc;

    state_space! {
        enum ReviewState {
            Pending => [review -> { to: Approved, reject: Rejected }],
            Approved => [archive -> Archived],
            Rejected => [],
            Archived => [],
        }
    }

    #[derive(Clone)]
    struct Submission {
        state: Arc<Mutex<ReviewState>>,
    }

    impl Submission {
        fn new() -> Self {
            Self {
                state: Arc::new(Mutex::new(ReviewState::Pending)),
            }
        }
    }

    impl Subject<ReviewState> for Submission {
        fn current_state(&self) -> ReviewState {
            self.state.lock().clone()
        }

        fn apply_state(&self, next: ReviewState) {
            *self.state.lock() = next;
        }
    }

    type ReviewEvent = TransitionEvent<ReviewState, Submission>;

    fn machine_with_events() -> (StateMachine<ReviewState>, Arc<Dispatcher>) {
        let events = Arc::new(Dispatcher::new());
        let machine = StateMachine::with_events(TransitionTable::from_space(), Arc::clone(&events));
        (machine, events)
    }

    #[test]
    fn apply_without_dispatcher_takes_default_path() {
        let machine = StateMachine::new(TransitionTable::<ReviewState>::from_space());
        let submission = Submission::new();

        let outcome = machine.apply(&submission, "review").unwrap();

        assert_eq!(
            outcome,
            ApplyOutcome::Transitioned {
                from: ReviewState::Pending,
                to: ReviewState::Approved,
                path: "to".to_string(),
            }
        );
        assert_eq!(submission.current_state(), ReviewState::Approved);
    }

    #[test]
    fn unknown_action_fails_without_mutating() {
        let machine = StateMachine::new(TransitionTable::<ReviewState>::from_space());
        let submission = Submission::new();

        let err = machine.apply(&submission, "nonexistent-action").unwrap_err();

        assert!(matches!(err, ApplyError::NoSuchTransition { .. }));
        assert_eq!(submission.current_state(), ReviewState::Pending);
    }

    #[test]
    fn guard_veto_prevents_mutation_and_after_event() {
        let (machine, events) = machine_with_events();
        let after_ran = Arc::new(Mutex::new(false));
        let observed = Arc::clone(&after_ran);

        events.add_listener(
            guard_event_name("Pending", "review"),
            |event: &mut ReviewEvent| {
                event.stop_propagation();
                Ok(())
            },
        );
        events.add_listener(
            after_event_name("Pending", "review"),
            move |_event: &mut ReviewEvent| {
                *observed.lock() = true;
                Ok(())
            },
        );

        let submission = Submission::new();
        let outcome = machine.apply(&submission, "review").unwrap();

        assert_eq!(
            outcome,
            ApplyOutcome::Vetoed {
                state: ReviewState::Pending,
                action: "review".to_string(),
            }
        );
        assert_eq!(submission.current_state(), ReviewState::Pending);
        assert!(!*after_ran.lock());
    }

    #[test]
    fn guard_redirect_moves_subject_down_named_path() {
        let (machine, events) = machine_with_events();

        events.add_listener(
            guard_event_name("Pending", "review"),
            |event: &mut ReviewEvent| {
                event.path = "reject".to_string();
                Ok(())
            },
        );

        let submission = Submission::new();
        let outcome = machine.apply(&submission, "review").unwrap();

        assert_eq!(
            outcome,
            ApplyOutcome::Transitioned {
                from: ReviewState::Pending,
                to: ReviewState::Rejected,
                path: "reject".to_string(),
            }
        );
        assert_eq!(submission.current_state(), ReviewState::Rejected);
    }

    #[test]
    fn after_event_reports_redirected_target() {
        let (machine, events) = machine_with_events();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);

        events.add_listener(
            guard_event_name("Pending", "review"),
            |event: &mut ReviewEvent| {
                event.path = "reject".to_string();
                Ok(())
            },
        );
        events.add_listener(
            after_event_name("Pending", "review"),
            move |event: &mut ReviewEvent| {
                *sink.lock() = Some(event.to.clone());
                Ok(())
            },
        );

        let submission = Submission::new();
        machine.apply(&submission, "review").unwrap();

        assert_eq!(*seen.lock(), Some(ReviewState::Rejected));
    }

    #[test]
    fn guard_sees_provisional_default_target() {
        let (machine, events) = machine_with_events();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);

        events.add_listener(
            guard_event_name("Pending", "review"),
            move |event: &mut ReviewEvent| {
                *sink.lock() = Some((event.from.clone(), event.to.clone(), event.path.clone()));
                Ok(())
            },
        );

        let submission = Submission::new();
        machine.apply(&submission, "review").unwrap();

        assert_eq!(
            *seen.lock(),
            Some((
                ReviewState::Pending,
                ReviewState::Approved,
                "to".to_string()
            ))
        );
    }

    #[test]
    fn redirect_to_undeclared_path_fails() {
        let (machine, events) = machine_with_events();

        events.add_listener(
            guard_event_name("Pending", "review"),
            |event: &mut ReviewEvent| {
                event.path = "escalate".to_string();
                Ok(())
            },
        );

        let submission = Submission::new();
        let err = machine.apply(&submission, "review").unwrap_err();

        assert!(matches!(err, ApplyError::Path(_)));
        // The bad path is caught before the mutation is committed.
        assert_eq!(submission.current_state(), ReviewState::Pending);
    }

    #[test]
    fn guard_listener_error_propagates_without_mutation() {
        let (machine, events) = machine_with_events();

        events.add_listener(
            guard_event_name("Pending", "review"),
            |_event: &mut ReviewEvent| Err("guard exploded".into()),
        );

        let submission = Submission::new();
        let err = machine.apply(&submission, "review").unwrap_err();

        assert!(matches!(err, ApplyError::Listener(_)));
        assert_eq!(submission.current_state(), ReviewState::Pending);
    }

    #[test]
    fn affordances_of_reflects_current_state() {
        let machine = StateMachine::new(TransitionTable::<ReviewState>::from_space());
        let submission = Submission::new();

        let affordances = machine.affordances_of(&submission);
        assert_eq!(affordances.len(), 1);
        assert_eq!(affordances[0].action, "review");
        assert_eq!(affordances[0].to, ReviewState::Approved);

        submission.apply_state(ReviewState::Rejected);
        assert!(machine.affordances_of(&submission).is_empty());
    }

    #[test]
    fn apply_is_deterministic_for_fixed_guard_behavior() {
        let (machine, events) = machine_with_events();

        events.add_listener(
            guard_event_name("Pending", "review"),
            |event: &mut ReviewEvent| {
                event.path = "reject".to_string();
                Ok(())
            },
        );

        for _ in 0..3 {
            let submission = Submission::new();
            let outcome = machine.apply(&submission, "review").unwrap();
            assert_eq!(
                outcome,
                ApplyOutcome::Transitioned {
                    from: ReviewState::Pending,
                    to: ReviewState::Rejected,
                    path: "reject".to_string(),
                }
            );
        }
    }
}
