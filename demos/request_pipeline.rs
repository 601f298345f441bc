//! Request pipeline
//!
//! This example runs one call through the linear request lifecycle, then
//! registers an envelope subscriber on the route-invoked event and runs the
//! same call again.
//!
//! Key concepts:
//! - Driving a per-call subject by its affordances
//! - Stage work in guard events
//! - Rewriting the response from a `RouteInvoked` subscriber
//!
//! Run with: cargo run --example request_pipeline

use serde_json::json;
use std::sync::Arc;
use waypoint::event::Dispatcher;
use waypoint::pipeline::{RequestHandler, Route, RouteInvoked};

fn main() {
    env_logger::init();

    println!("=== Request Pipeline ===\n");

    let events = Arc::new(Dispatcher::new());
    let handler = RequestHandler::new(Arc::clone(&events));
    let route = Route::new("widgets", |request| {
        Ok(json!({ "id": 7, "echo": request.body }).into())
    });

    let outgoing = handler
        .handle(Box::new(json!({"q": "full"})), route.clone())
        .unwrap();
    println!("Plain response:     {} {}", outgoing.status, outgoing.body);

    events.on::<RouteInvoked, _>(|event| {
        event.response.body = json!({
            "data": event.response.body,
            "meta": { "route": event.route.name() },
        });
        Ok(())
    });

    let outgoing = handler
        .handle(Box::new(json!({"q": "full"})), route)
        .unwrap();
    println!("Enveloped response: {} {}", outgoing.status, outgoing.body);

    println!("\n=== Example Complete ===");
}
