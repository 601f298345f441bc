//! Door state machine
//!
//! This example demonstrates affordance-driven control of a small cyclic
//! state space.
//!
//! Key concepts:
//! - Declarative state spaces via `state_space!`
//! - Applying named actions with `StateMachine::apply`
//! - Discovering legal next actions with `affordances_of`
//!
//! Run with: cargo run --example door

use parking_lot::Mutex;
use std::sync::Arc;
use waypoint::core::Subject;
use waypoint::machine::{StateMachine, TransitionTable};
use waypoint::state_space;

state_space! {
    pub enum DoorState {
        Open => [close -> Closed],
        Closed => [open -> Open, lock -> Locked],
        Locked => [unlock -> Closed],
    }
}

#[derive(Clone)]
struct Door(Arc<Mutex<DoorState>>);

impl Subject<DoorState> for Door {
    fn current_state(&self) -> DoorState {
        self.0.lock().clone()
    }

    fn apply_state(&self, next: DoorState) {
        *self.0.lock() = next;
    }
}

fn main() {
    env_logger::init();

    println!("=== Door State Machine ===\n");

    let machine = StateMachine::new(TransitionTable::<DoorState>::from_space());
    let door = Door(Arc::new(Mutex::new(DoorState::Open)));

    println!("Initial state: {:?}", door.current_state());

    for action in ["close", "lock", "unlock", "open"] {
        let affordances = machine.affordances_of(&door);
        let available: Vec<&str> = affordances
            .iter()
            .map(|affordance| affordance.action.as_str())
            .collect();
        println!("\nAvailable actions: {available:?}");

        machine.apply(&door, action).unwrap();
        println!("Applied '{action}' -> {:?}", door.current_state());
    }

    println!("\n=== Example Complete ===");
}
