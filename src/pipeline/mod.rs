//! Request pipeline: a linear, affordance-driven consumer of the engine.
//!
//! Each inbound call creates one [`Request`] subject in `Received` and
//! drives it through `convert`, `invoke`, and `respond` until the terminal
//! `Responded` state. Blocking stage work happens in each edge's guard
//! event, so after-event observers only see a stage once it is committed;
//! the invoke after-event feeds the [`RouteInvoked`] extensibility point.

mod error;
mod request;
mod response;
mod route;

pub use error::PipelineError;
pub use request::{PreparedRequest, RawRequest, Request, RequestContext, RequestState};
pub use response::{OutgoingResponse, Response};
pub use route::{HandlerFn, HandlerReply, Route, RouteInvoked};

use crate::core::{State, Subject, TransitionRecord};
use crate::event::{BoxError, Dispatcher};
use crate::machine::{
    after_event_name, guard_event_name, ApplyOutcome, StateMachine, TransitionEvent,
    TransitionTable,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

/// Transition event flowing through the request pipeline.
pub type PipelineEvent = TransitionEvent<RequestState, Request>;

/// Converter from the adapter's opaque payload to the internal
/// representation, called by the convert stage.
pub type ConvertFn = dyn Fn(RawRequest, &Route) -> Result<PreparedRequest, BoxError> + Send + Sync;

/// Materializer from the internal response to the platform-facing one,
/// called by the respond stage.
pub type FinalizeFn = dyn Fn(&Response) -> Result<OutgoingResponse, BoxError> + Send + Sync;

/// The adapter seam: the two converters the platform binding supplies for
/// the edges of the pipeline.
///
/// The defaults speak JSON: the raw payload must downcast to a
/// `serde_json::Value` (or to a ready-made [`PreparedRequest`]), and the
/// outgoing body is the JSON serialization of the internal one.
#[derive(Clone)]
pub struct Binding {
    /// Convert-stage translation.
    pub convert: Arc<ConvertFn>,
    /// Respond-stage materialization.
    pub finalize: Arc<FinalizeFn>,
}

impl Binding {
    /// Build a binding from explicit converters.
    pub fn new<C, F>(convert: C, finalize: F) -> Self
    where
        C: Fn(RawRequest, &Route) -> Result<PreparedRequest, BoxError> + Send + Sync + 'static,
        F: Fn(&Response) -> Result<OutgoingResponse, BoxError> + Send + Sync + 'static,
    {
        Self {
            convert: Arc::new(convert),
            finalize: Arc::new(finalize),
        }
    }
}

impl Default for Binding {
    fn default() -> Self {
        Self::new(default_convert, default_finalize)
    }
}

fn default_convert(raw: RawRequest, route: &Route) -> Result<PreparedRequest, BoxError> {
    let raw = match raw.downcast::<PreparedRequest>() {
        Ok(prepared) => return Ok(*prepared),
        Err(raw) => raw,
    };
    match raw.downcast::<serde_json::Value>() {
        Ok(body) => Ok(PreparedRequest {
            route: route.name().to_string(),
            body: *body,
            attributes: HashMap::new(),
        }),
        Err(_) => Err("incoming payload is not JSON; supply a custom converter".into()),
    }
}

fn default_finalize(response: &Response) -> Result<OutgoingResponse, BoxError> {
    let body = serde_json::to_string(&response.body)?;
    let mut headers = response.headers.clone();
    headers
        .entry("content-type".to_string())
        .or_insert_with(|| "application/json".to_string());
    Ok(OutgoingResponse {
        status: response.status,
        body,
        headers,
    })
}

/// Drives one request subject per call through the fixed linear lifecycle.
///
/// Construction registers the stage listeners on the dispatcher once;
/// [`handle`](Self::handle) may then be called for any number of requests.
///
/// # Example
///
/// ```rust
/// use waypoint::event::Dispatcher;
/// use waypoint::pipeline::{RequestHandler, Route};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let events = Arc::new(Dispatcher::new());
/// let handler = RequestHandler::new(Arc::clone(&events));
///
/// let route = Route::new("widgets", |_request| Ok(json!({"id": 7}).into()));
/// let outgoing = handler.handle(Box::new(json!({})), route).unwrap();
///
/// assert_eq!(outgoing.status, 200);
/// assert_eq!(outgoing.body, r#"{"id":7}"#);
/// ```
pub struct RequestHandler {
    machine: StateMachine<RequestState>,
    events: Arc<Dispatcher>,
}

impl RequestHandler {
    /// Create a handler with the default JSON binding.
    pub fn new(events: Arc<Dispatcher>) -> Self {
        Self::with_binding(events, Binding::default())
    }

    /// Create a handler with an adapter-supplied binding.
    pub fn with_binding(events: Arc<Dispatcher>, binding: Binding) -> Self {
        let handler = Self {
            machine: StateMachine::with_events(
                TransitionTable::from_space(),
                Arc::clone(&events),
            ),
            events,
        };
        handler.install_stages(binding);
        handler
    }

    /// The dispatcher the pipeline emits through. Subscribers for
    /// [`RouteInvoked`] register here.
    pub fn events(&self) -> &Arc<Dispatcher> {
        &self.events
    }

    /// Register the stage listeners. Stage work lives in guard events so an
    /// after-event observer only ever sees a committed stage.
    fn install_stages(&self, binding: Binding) {
        let received = RequestState::Received;
        let prepared = RequestState::Prepared;
        let invoked = RequestState::Invoked;

        let convert = Arc::clone(&binding.convert);
        self.events.add_listener(
            guard_event_name(received.name(), "convert"),
            move |event: &mut PipelineEvent| {
                let request = event.subject.clone();
                let mut ctx = request.context();
                let raw = ctx.raw.take().ok_or("incoming payload already consumed")?;
                let converted = convert(raw, &ctx.route)?;
                log::debug!(
                    "request {} prepared for route '{}'",
                    request.id(),
                    ctx.route.name()
                );
                ctx.prepared = Some(converted);
                Ok(())
            },
        );

        self.events.add_listener(
            guard_event_name(prepared.name(), "invoke"),
            move |event: &mut PipelineEvent| {
                let request = event.subject.clone();
                let mut ctx = request.context();
                let current = ctx
                    .prepared
                    .as_ref()
                    .ok_or("invoke stage ran before convert")?;
                let response = match ctx.route.invoke(current) {
                    Ok(HandlerReply::Body(body)) => Response::ok(body),
                    Ok(HandlerReply::Full(response)) => response,
                    Err(err) => {
                        log::warn!("route '{}' handler failed: {err}", ctx.route.name());
                        Response::error(500, err.to_string())
                    }
                };
                ctx.response = Some(response);
                Ok(())
            },
        );

        // Weak handle: the dispatcher must not own itself through this
        // listener.
        let invoke_events = Arc::downgrade(&self.events);
        self.events.add_listener(
            after_event_name(prepared.name(), "invoke"),
            move |event: &mut PipelineEvent| {
                let request = event.subject.clone();
                let (current, route, response) = {
                    let mut ctx = request.context();
                    let current = ctx
                        .prepared
                        .clone()
                        .ok_or("invoke committed without a prepared request")?;
                    let response = ctx
                        .response
                        .take()
                        .ok_or("invoke committed without a response")?;
                    (current, ctx.route.clone(), response)
                };

                let mut invoked_event = RouteInvoked::new(current, route, response);
                if let Some(events) = invoke_events.upgrade() {
                    events.dispatch(&mut invoked_event)?;
                }
                request.context().response = Some(invoked_event.response);
                Ok(())
            },
        );

        let finalize = Arc::clone(&binding.finalize);
        self.events.add_listener(
            guard_event_name(invoked.name(), "respond"),
            move |event: &mut PipelineEvent| {
                let request = event.subject.clone();
                let mut ctx = request.context();
                let response = ctx
                    .response
                    .as_ref()
                    .ok_or("respond stage ran before invoke")?;
                let outgoing = finalize(response)?;
                ctx.outgoing = Some(outgoing);
                Ok(())
            },
        );
    }

    /// Process one inbound call: create the request subject, drive it by
    /// its affordances until the terminal state, and return the outgoing
    /// response.
    ///
    /// The linear pipeline supports exactly one affordance per state and
    /// treats a vetoed stage as fatal; both are valid shapes for the
    /// generic engine but misconfigurations here.
    pub fn handle(&self, raw: RawRequest, route: Route) -> Result<OutgoingResponse, PipelineError> {
        let request = Request::new(raw, route);
        log::debug!("handling request {}", request.id());

        loop {
            let affordances = self.machine.affordances_of(&request);
            if affordances.is_empty() {
                break;
            }
            if affordances.len() > 1 {
                return Err(PipelineError::Ambiguous {
                    state: request.current_state().name().to_string(),
                    count: affordances.len(),
                });
            }

            let action = affordances[0].action.clone();
            match self.machine.apply(&request, &action)? {
                ApplyOutcome::Transitioned { from, to, path } => {
                    request.record(TransitionRecord {
                        from,
                        to,
                        action,
                        path,
                        timestamp: Utc::now(),
                    });
                }
                ApplyOutcome::Vetoed { state, action } => {
                    return Err(PipelineError::Stalled {
                        state: state.name().to_string(),
                        action,
                    });
                }
            }
        }

        let outgoing = request.context().outgoing.take();
        outgoing.ok_or(PipelineError::NoResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use serde_json::json;

    fn widget_route() -> Route {
        Route::new("widgets", |_request| Ok(json!({"id": 7}).into()))
    }

    #[test]
    fn happy_path_reaches_responded_with_200() {
        let events = Arc::new(Dispatcher::new());
        let handler = RequestHandler::new(Arc::clone(&events));

        let outgoing = handler
            .handle(Box::new(json!({"q": 1})), widget_route())
            .unwrap();

        assert_eq!(outgoing.status, 200);
        assert_eq!(outgoing.body, r#"{"id":7}"#);
        assert_eq!(
            outgoing.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn handler_error_becomes_500_and_pipeline_completes() {
        let events = Arc::new(Dispatcher::new());
        let handler = RequestHandler::new(Arc::clone(&events));

        let route = Route::new("widgets", |_request| Err("database unavailable".into()));
        let outgoing = handler.handle(Box::new(json!({})), route).unwrap();

        assert_eq!(outgoing.status, 500);
        assert!(outgoing.body.contains("database unavailable"));
    }

    #[test]
    fn full_response_from_handler_passes_through() {
        let events = Arc::new(Dispatcher::new());
        let handler = RequestHandler::new(Arc::clone(&events));

        let route = Route::new("widgets", |_request| {
            Ok(Response::with_status(201, json!({"created": true})).into())
        });
        let outgoing = handler.handle(Box::new(json!({})), route).unwrap();

        assert_eq!(outgoing.status, 201);
        assert_eq!(outgoing.body, r#"{"created":true}"#);
    }

    #[test]
    fn route_invoked_subscriber_can_replace_response() {
        let events = Arc::new(Dispatcher::new());
        let handler = RequestHandler::new(Arc::clone(&events));

        events.on::<RouteInvoked, _>(|event| {
            let wrapped = json!({ "data": event.response.body, "meta": {} });
            event.response.body = wrapped;
            Ok(())
        });

        let outgoing = handler.handle(Box::new(json!({})), widget_route()).unwrap();

        assert_eq!(outgoing.status, 200);
        assert_eq!(outgoing.body, r#"{"data":{"id":7},"meta":{}}"#);
    }

    #[test]
    fn later_route_invoked_subscriber_wins_at_equal_priority() {
        let events = Arc::new(Dispatcher::new());
        let handler = RequestHandler::new(Arc::clone(&events));

        events.on::<RouteInvoked, _>(|event| {
            event.response.body = json!({"writer": "first"});
            Ok(())
        });
        events.on::<RouteInvoked, _>(|event| {
            event.response.body = json!({"writer": "second"});
            Ok(())
        });

        let outgoing = handler.handle(Box::new(json!({})), widget_route()).unwrap();
        assert_eq!(outgoing.body, r#"{"writer":"second"}"#);
    }

    #[test]
    fn vetoed_stage_is_a_stalled_pipeline() {
        let events = Arc::new(Dispatcher::new());
        let handler = RequestHandler::new(Arc::clone(&events));

        // A bystander guard at higher priority vetoes the mandatory invoke
        // stage.
        events.add_listener_with(
            guard_event_name(RequestState::Prepared.name(), "invoke"),
            100,
            |event: &mut PipelineEvent| {
                event.stop_propagation();
                Ok(())
            },
        );

        let err = handler
            .handle(Box::new(json!({})), widget_route())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Stalled { .. }));
    }

    #[test]
    fn non_json_payload_fails_the_convert_stage() {
        let events = Arc::new(Dispatcher::new());
        let handler = RequestHandler::new(Arc::clone(&events));

        let err = handler
            .handle(Box::new("not json"), widget_route())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Apply(_)));
    }

    #[test]
    fn request_log_records_the_full_lifecycle() {
        let events = Arc::new(Dispatcher::new());
        let handler = RequestHandler::new(Arc::clone(&events));

        let log = Arc::new(parking_lot::Mutex::new(None));
        let sink = Arc::clone(&log);
        events.add_listener(
            after_event_name(RequestState::Invoked.name(), "respond"),
            move |event: &mut PipelineEvent| {
                *sink.lock() = Some(event.subject.clone());
                Ok(())
            },
        );

        handler.handle(Box::new(json!({})), widget_route()).unwrap();

        let request = log.lock().clone().expect("after listener saw the request");
        let actions: Vec<String> = request
            .log()
            .records()
            .iter()
            .map(|record| record.action.clone())
            .collect();
        assert_eq!(actions, vec!["convert", "invoke", "respond"]);
        assert_eq!(
            request.log().path_taken().len(),
            request.log().records().len() + 1
        );
    }

    #[test]
    fn custom_binding_controls_both_edges() {
        let events = Arc::new(Dispatcher::new());
        let binding = Binding::new(
            |raw, route: &Route| {
                let text = raw
                    .downcast::<String>()
                    .map_err(|_| "expected a string payload")?;
                Ok(PreparedRequest {
                    route: route.name().to_string(),
                    body: json!({ "text": *text }),
                    attributes: HashMap::new(),
                })
            },
            |response| {
                Ok(OutgoingResponse {
                    status: response.status,
                    body: format!("wrapped:{}", response.body),
                    headers: response.headers.clone(),
                })
            },
        );
        let handler = RequestHandler::with_binding(Arc::clone(&events), binding);

        let route = Route::new("echo", |request| Ok(request.body.clone().into()));
        let outgoing = handler
            .handle(Box::new("hello".to_string()), route)
            .unwrap();

        assert_eq!(outgoing.status, 200);
        assert_eq!(outgoing.body, r#"wrapped:{"text":"hello"}"#);
    }

    #[test]
    fn prepared_payloads_skip_default_conversion() {
        let events = Arc::new(Dispatcher::new());
        let handler = RequestHandler::new(Arc::clone(&events));

        let prepared = PreparedRequest {
            route: "custom".to_string(),
            body: json!({"preconverted": true}),
            attributes: HashMap::new(),
        };
        let route = Route::new("widgets", |request| Ok(request.body.clone().into()));

        let outgoing = handler.handle(Box::new(prepared), route).unwrap();
        assert_eq!(outgoing.body, r#"{"preconverted":true}"#);
    }
}
