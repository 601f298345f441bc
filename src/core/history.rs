//! Transition log: immutable audit trail of applied transitions.
//!
//! Drivers append a record after each committed transition. The log is a
//! value; `record` returns a new log rather than mutating in place.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single committed transition.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRecord<S: State> {
    /// The state the subject was in before the action.
    pub from: S,
    /// The state actually entered, after any guard redirection.
    pub to: S,
    /// The action that was applied.
    pub action: String,
    /// The path the transition resolved through (`"to"` unless a guard
    /// redirected it).
    pub path: String,
    /// When the transition was committed.
    pub timestamp: DateTime<Utc>,
}

/// Ordered log of committed transitions.
///
/// # Example
///
/// ```rust
/// use waypoint::core::{TransitionLog, TransitionRecord};
/// use waypoint::state_space;
/// use chrono::Utc;
///
/// state_space! {
///     enum WorkState {
///         Start => [advance -> End],
///         End => [],
///     }
/// }
///
/// let log = TransitionLog::new();
/// let log = log.record(TransitionRecord {
///     from: WorkState::Start,
///     to: WorkState::End,
///     action: "advance".to_string(),
///     path: "to".to_string(),
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(log.path_taken(), vec![&WorkState::Start, &WorkState::End]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionLog<S: State> {
    records: Vec<TransitionRecord<S>>,
}

impl<S: State> Default for TransitionLog<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> TransitionLog<S> {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Return a new log with the record appended. The original is unchanged.
    pub fn record(&self, record: TransitionRecord<S>) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    /// The committed records, oldest first.
    pub fn records(&self) -> &[TransitionRecord<S>] {
        &self.records
    }

    /// Number of committed transitions.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing has been committed yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The sequence of states visited: the first record's `from` followed by
    /// every record's `to`. Empty log yields an empty path.
    pub fn path_taken(&self) -> Vec<&S> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.first() {
            path.push(&first.from);
        }
        for record in &self.records {
            path.push(&record.to);
        }
        path
    }

    /// Wall-clock span between the first and last record, if the log holds
    /// at least one record.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }
}
