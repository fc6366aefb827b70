//! State and transition descriptors.
//!
//! A state machine is declared as a flat slice of [`State`] descriptors that
//! reference each other by [`StateId`]. The descriptors are plain data; all
//! cross-references are resolved (and validated) once, when the machine is
//! built. Behavior is attached through borrowed closures, so each callback
//! carries whatever caller-side context it captures and no global state is
//! ever needed.

use crate::event::{Event, EventId};
use crate::queue::EventSink;

/// Maximum level of state nesting, excluding the root state.
///
/// With a depth of 3, the deepest legal hierarchy is
/// `root -> A -> B -> C`.
pub const MAX_NESTED_DEPTH: usize = 3;

/// Identifier of a state, unique within one state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId(pub u8);

/// Guard condition evaluated before a matched transition is taken.
///
/// Returning `0` allows the transition; any non-zero value denies it and is
/// reported through [`StepOutcome::GuardDenied`](crate::StepOutcome).
///
/// A guard must have no side effect. If a denied guard had already changed
/// the system, the system and the state machine would disagree, defeating the
/// point of a state machine. Side effects belong in the transition action; a
/// guard that needs one is a sign the machine is missing a state.
pub type GuardFn<'a> = &'a dyn Fn(&Event) -> u8;

/// Action executed when a transition is taken, between the exit cascade and
/// the entry cascade. Receives the triggering event and the write end of the
/// machine's own event queue, so it may queue follow-up events.
pub type ActionFn<'a> = &'a dyn Fn(&Event, &mut dyn EventSink);

/// Action executed when a state is entered or exited. Like a transition
/// action, it may queue follow-up events through the lent sink.
pub type StateActionFn<'a> = &'a dyn Fn(&mut dyn EventSink);

/// How a self-transition treats its state's entry and exit actions.
///
/// The distinction only matters when a transition's target is the state the
/// machine is currently in; for any other transition the kind is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionKind {
    /// The state is exited and re-entered: exit action, transition action,
    /// entry action, in that order.
    #[default]
    External,
    /// Only the transition action runs; entry/exit actions are suppressed.
    Internal,
}

/// A transition originating from the state whose `transitions` slice holds it.
///
/// Within one state, transitions are matched against an event in declaration
/// order.
pub struct Transition<'a> {
    /// Destination state; must exist and must not be the root state.
    pub target: StateId,
    /// The event id that triggers this transition.
    pub event: EventId,
    pub kind: TransitionKind,
    /// Optional guard; absent means the transition is always allowed.
    pub guard: Option<GuardFn<'a>>,
    /// Optional action, run exactly once per taken transition.
    pub action: Option<ActionFn<'a>>,
}

impl<'a> Transition<'a> {
    /// An unguarded external transition to `target`, triggered by `event`.
    #[must_use]
    pub const fn on(event: EventId, target: StateId) -> Self {
        Self {
            target,
            event,
            kind: TransitionKind::External,
            guard: None,
            action: None,
        }
    }

    /// An internal self-transition on `state`, triggered by `event`.
    #[must_use]
    pub const fn internal(event: EventId, state: StateId) -> Self {
        Self {
            target: state,
            event,
            kind: TransitionKind::Internal,
            guard: None,
            action: None,
        }
    }

    #[must_use]
    pub fn with_guard(mut self, guard: GuardFn<'a>) -> Self {
        self.guard = Some(guard);
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: ActionFn<'a>) -> Self {
        self.action = Some(action);
        self
    }
}

/// A state descriptor.
pub struct State<'a> {
    /// Unique id of this state.
    pub id: StateId,
    /// A machine that reaches a final state stops; every later step reports
    /// [`StepOutcome::Terminated`](crate::StepOutcome). The entry action of
    /// the final state still runs on the way in.
    pub is_final: bool,
    /// Enclosing state; `None` only for the single root state.
    pub parent: Option<StateId>,
    /// Default sub-state entered when this state is entered without a more
    /// specific target. Required on the root state, optional elsewhere.
    pub initial: Option<StateId>,
    pub on_entry: Option<StateActionFn<'a>>,
    pub on_exit: Option<StateActionFn<'a>>,
    /// Transitions originating from this state, including self-transitions.
    pub transitions: &'a [Transition<'a>],
}

impl<'a> State<'a> {
    /// The root state of a machine. It has no parent and, by construction
    /// here, no transitions (the validator rejects a root that has any).
    #[must_use]
    pub const fn root(id: StateId, initial: StateId) -> Self {
        Self {
            id,
            is_final: false,
            parent: None,
            initial: Some(initial),
            on_entry: None,
            on_exit: None,
            transitions: &[],
        }
    }

    /// A non-root state nested directly under `parent`.
    #[must_use]
    pub const fn new(id: StateId, parent: StateId) -> Self {
        Self {
            id,
            is_final: false,
            parent: Some(parent),
            initial: None,
            on_entry: None,
            on_exit: None,
            transitions: &[],
        }
    }

    /// Marks this state as a composite with `initial` as its default
    /// sub-state. `initial` must declare this state as its parent.
    #[must_use]
    pub const fn with_initial(mut self, initial: StateId) -> Self {
        self.initial = Some(initial);
        self
    }

    /// Marks this state as final.
    #[must_use]
    pub const fn final_state(mut self) -> Self {
        self.is_final = true;
        self
    }

    #[must_use]
    pub fn with_entry(mut self, action: StateActionFn<'a>) -> Self {
        self.on_entry = Some(action);
        self
    }

    #[must_use]
    pub fn with_exit(mut self, action: StateActionFn<'a>) -> Self {
        self.on_exit = Some(action);
        self
    }

    #[must_use]
    pub const fn with_transitions(mut self, transitions: &'a [Transition<'a>]) -> Self {
        self.transitions = transitions;
        self
    }
}
