//! Routes, handler replies, and the route-invoked event.

use super::request::PreparedRequest;
use super::response::Response;
use crate::event::{BoxError, Event, NamedEvent, Propagation};
use serde_json::Value;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// What a route handler returns on success: either a raw body the invoke
/// stage wraps into a 200 response, or an already-built response adopted
/// as-is.
pub enum HandlerReply {
    /// A raw body value.
    Body(Value),
    /// A fully constructed response.
    Full(Response),
}

impl From<Value> for HandlerReply {
    fn from(body: Value) -> Self {
        Self::Body(body)
    }
}

impl From<Response> for HandlerReply {
    fn from(response: Response) -> Self {
        Self::Full(response)
    }
}

/// Route handler callable. Errors are caught by the invoke stage and turned
/// into 500 responses; the pipeline continues to the respond stage.
pub type HandlerFn = dyn Fn(&PreparedRequest) -> Result<HandlerReply, BoxError> + Send + Sync;

/// A matched route: a name plus the handler to invoke.
#[derive(Clone)]
pub struct Route {
    name: String,
    handler: Arc<HandlerFn>,
}

impl Route {
    /// Create a route around a handler.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&PreparedRequest) -> Result<HandlerReply, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            handler: Arc::new(handler),
        }
    }

    /// The route's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call the handler with the internal request representation.
    pub fn invoke(&self, request: &PreparedRequest) -> Result<HandlerReply, BoxError> {
        (self.handler)(request)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route").field("name", &self.name).finish()
    }
}

/// Dispatched once the invoke stage has committed, carrying the request,
/// the route, and the mutable response.
///
/// Subscribers may replace [`response`](Self::response) wholesale (for
/// example to wrap it in an envelope); the pipeline adopts whatever the
/// field holds after dispatch. With several subscribers the usual priority
/// rules apply, so the last writer in dispatch order wins.
pub struct RouteInvoked {
    /// The internal request representation the handler saw.
    pub request: PreparedRequest,
    /// The route that was invoked.
    pub route: Route,
    /// The response the pipeline will carry forward.
    pub response: Response,
    propagation: Propagation,
}

impl RouteInvoked {
    /// Build the event around the invoke stage's outcome.
    pub fn new(request: PreparedRequest, route: Route, response: Response) -> Self {
        Self {
            request,
            route,
            response,
            propagation: Propagation::new(),
        }
    }
}

impl Event for RouteInvoked {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(Self::NAME)
    }

    fn propagation(&self) -> &Propagation {
        &self.propagation
    }

    fn propagation_mut(&mut self) -> &mut Propagation {
        &mut self.propagation
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl NamedEvent for RouteInvoked {
    const NAME: &'static str = "pipeline.route_invoked";
}
