//! Per-call request subject and its execution context.

use super::response::{OutgoingResponse, Response};
use super::route::Route;
use crate::core::{Subject, TransitionLog, TransitionRecord};
use crate::state_space;
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

state_space! {
    /// The per-request lifecycle: a strictly linear chain with one action
    /// advancing each edge. `Responded` is terminal.
    pub enum RequestState {
        Received => [convert -> Prepared],
        Prepared => [invoke -> Invoked],
        Invoked => [respond -> Responded],
        Responded => [],
    }
}

/// The opaque payload handed in by the inbound call adapter. The pipeline
/// never interprets it; the convert stage hands it to the adapter-supplied
/// converter.
pub type RawRequest = Box<dyn Any + Send>;

/// The pipeline's internal request representation, produced by the convert
/// stage and visible to the route handler and downstream consumers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreparedRequest {
    /// The matched route's name.
    pub route: String,
    /// The request payload.
    pub body: Value,
    /// Additional attributes the converter chose to surface.
    pub attributes: HashMap<String, Value>,
}

/// Everything accumulated while a request moves through the pipeline.
///
/// Stages fill the fields in lifecycle order: `raw` is consumed by the
/// convert stage, which publishes `prepared`; the invoke stage publishes
/// `response`; the respond stage materializes `outgoing`.
pub struct RequestContext {
    /// The opaque incoming payload, present until the convert stage runs.
    pub raw: Option<RawRequest>,
    /// The matched route.
    pub route: Route,
    /// The internal representation, present once converted.
    pub prepared: Option<PreparedRequest>,
    /// The handler's response, present once invoked.
    pub response: Option<Response>,
    /// The platform-facing response, present once materialized.
    pub outgoing: Option<OutgoingResponse>,
}

struct RequestInner {
    id: Uuid,
    state: Mutex<RequestState>,
    context: Mutex<RequestContext>,
    log: Mutex<TransitionLog<RequestState>>,
}

/// A per-call subject: one is created per inbound call and discarded once
/// the terminal state is reached.
///
/// `Request` is a cheap shared handle; transition events carry clones of it
/// so the pipeline's stage listeners can reach the context.
#[derive(Clone)]
pub struct Request {
    inner: Arc<RequestInner>,
}

impl Request {
    /// Create a fresh request in `Received` with its context attached.
    pub fn new(raw: RawRequest, route: Route) -> Self {
        Self {
            inner: Arc::new(RequestInner {
                id: Uuid::new_v4(),
                state: Mutex::new(RequestState::Received),
                context: Mutex::new(RequestContext {
                    raw: Some(raw),
                    route,
                    prepared: None,
                    response: None,
                    outgoing: None,
                }),
                log: Mutex::new(TransitionLog::new()),
            }),
        }
    }

    /// This request's unique id.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Lock the execution context. Callers must drop the guard before
    /// dispatching events that may need the context again.
    pub fn context(&self) -> MutexGuard<'_, RequestContext> {
        self.inner.context.lock()
    }

    /// Append a committed transition to the request's log.
    pub fn record(&self, record: TransitionRecord<RequestState>) {
        let mut log = self.inner.log.lock();
        *log = log.record(record);
    }

    /// Snapshot of the transition log so far.
    pub fn log(&self) -> TransitionLog<RequestState> {
        self.inner.log.lock().clone()
    }
}

impl Subject<RequestState> for Request {
    fn current_state(&self) -> RequestState {
        self.inner.state.lock().clone()
    }

    fn apply_state(&self, next: RequestState) {
        *self.inner.state.lock() = next;
    }
}
