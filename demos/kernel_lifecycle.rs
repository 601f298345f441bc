//! Kernel lifecycle
//!
//! This example drives the bundled kernel state space twice: once straight
//! to `Stopped`, and once with a guard listener that redirects the boot
//! finalization down the `failed` branch.
//!
//! Key concepts:
//! - Branching transitions with named paths
//! - Guard-time redirection from a listener
//! - Transition logs as an audit trail
//!
//! Run with: cargo run --example kernel_lifecycle

use std::sync::Arc;
use waypoint::core::State;
use waypoint::event::Dispatcher;
use waypoint::kernel::{Kernel, KernelState};
use waypoint::machine::{guard_event_name, StateMachine, TransitionEvent, TransitionTable};

fn main() {
    env_logger::init();

    println!("=== Kernel Lifecycle ===\n");

    // Clean run: boot finalizes down the default path.
    let machine = StateMachine::new(TransitionTable::<KernelState>::from_space());
    let kernel = Kernel::new();
    let settled = kernel.run(&machine).unwrap();
    println!("Clean run settled in: {settled:?}");
    for record in kernel.log().records() {
        println!(
            "  {} --{}({})--> {}",
            record.from.name(),
            record.action,
            record.path,
            record.to.name()
        );
    }

    // Failed boot: a guard listener redirects finalization.
    let events = Arc::new(Dispatcher::new());
    events.add_listener(
        guard_event_name("Booting", "finalize"),
        |event: &mut TransitionEvent<KernelState, Kernel>| {
            println!("  guard: boot checks failed, redirecting");
            event.path = "failed".to_string();
            Ok(())
        },
    );
    let machine = StateMachine::with_events(TransitionTable::from_space(), events);
    let kernel = Kernel::new();
    let settled = kernel.run(&machine).unwrap();
    println!("\nFailed boot settled in: {settled:?}");

    println!("\n=== Example Complete ===");
}
