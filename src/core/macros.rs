//! Macros for declaring state spaces.

/// Declare a state space: an enum plus its per-state transition metadata.
///
/// Each variant lists its outgoing transitions as `action -> Target` for a
/// single-target transition, or `action -> { path: Target, ... }` for a
/// branching one. Terminal states declare `[]`.
///
/// # Example
///
/// ```
/// use waypoint::state_space;
///
/// state_space! {
///     pub enum DoorState {
///         Open => [close -> Closed],
///         Closed => [open -> Open, lock -> Locked],
///         Locked => [unlock -> Closed],
///     }
/// }
/// ```
///
/// Branching transitions name every path explicitly; the `to` path is the
/// default one affordances and unguarded applies resolve through:
///
/// ```
/// use waypoint::state_space;
///
/// state_space! {
///     pub enum ReviewState {
///         Pending => [review -> { to: Approved, reject: Rejected }],
///         Approved => [],
///         Rejected => [],
///     }
/// }
/// ```
#[macro_export]
macro_rules! state_space {
    (@transition $action:ident -> { $( $path:ident : $ptarget:ident ),+ $(,)? }) => {
        $crate::core::Transition::branching(
            stringify!($action),
            [ $( (stringify!($path), Self::$ptarget) ),+ ],
        )
    };
    (@transition $action:ident -> $target:ident) => {
        $crate::core::Transition::to(stringify!($action), Self::$target)
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => [ $( $action:ident -> $target:tt ),* $(,)? ]
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn variants() -> Vec<Self> {
                vec![ $(Self::$variant),* ]
            }

            fn transitions(&self) -> Vec<$crate::core::Transition<Self>> {
                match self {
                    $(Self::$variant => vec![
                        $( $crate::state_space!(@transition $action -> $target) ),*
                    ]),*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{State, DEFAULT_PATH};

    state_space! {
        enum DoorState {
            Open => [close -> Closed],
            Closed => [open -> Open, lock -> Locked],
            Locked => [unlock -> Closed],
        }
    }

    #[test]
    fn macro_generates_names_and_variants() {
        assert_eq!(DoorState::Open.name(), "Open");
        assert_eq!(
            DoorState::variants(),
            vec![DoorState::Open, DoorState::Closed, DoorState::Locked]
        );
    }

    #[test]
    fn macro_generates_transition_metadata() {
        let transitions = DoorState::Closed.transitions();
        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[0].action(), "open");
        assert_eq!(transitions[1].action(), "lock");
        assert_eq!(
            transitions[1].resolve(DEFAULT_PATH).unwrap(),
            DoorState::Locked
        );
    }

    #[test]
    fn macro_supports_branching_targets() {
        state_space! {
            enum ReviewState {
                Pending => [review -> { to: Approved, reject: Rejected }],
                Approved => [],
                Rejected => [],
            }
        }

        let transitions = ReviewState::Pending.transitions();
        assert_eq!(transitions.len(), 1);
        assert_eq!(
            transitions[0].resolve("to").unwrap(),
            ReviewState::Approved
        );
        assert_eq!(
            transitions[0].resolve("reject").unwrap(),
            ReviewState::Rejected
        );
        assert!(ReviewState::Approved.is_terminal());
    }

    #[test]
    fn macro_supports_terminal_states() {
        assert!(!DoorState::Open.is_terminal());

        state_space! {
            enum HaltState {
                Running => [halt -> Halted],
                Halted => [],
            }
        }

        assert!(HaltState::Halted.is_terminal());
        assert!(HaltState::Halted.transitions().is_empty());
    }

    #[test]
    fn macro_supports_visibility() {
        state_space! {
            pub enum PublicState {
                A => [step -> B],
                B => [],
            }
        }

        let _state = PublicState::A;
    }
}
