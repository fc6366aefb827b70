//! The state machine engine: transition resolution, transition execution and
//! the step driver.

use heapless::Vec;

use crate::event::Event;
use crate::queue::{EventQueue, EventSink};
use crate::state::{MAX_NESTED_DEPTH, State, StateId, Transition, TransitionKind};
use crate::topology::{self, Topology};

/// Longest possible ancestor chain: a childmost state plus its ancestors up
/// to and including the root.
const MAX_CHAIN: usize = MAX_NESTED_DEPTH + 1;

/// Result of one call to [`Machine::step`]. Exactly one outcome per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A transition was executed. The very first step reports this too: it
    /// performs the implied, unconditional entry into the root's childmost
    /// initial descendant without consuming an event.
    Transitioned,
    /// The event queue was empty; nothing happened.
    Empty,
    /// An event was popped but no transition anywhere on the current state's
    /// ancestor chain is triggered by it; the event was dropped.
    Discarded,
    /// An event was popped and matched a transition, but a guard condition
    /// denied it. Carries the guard's non-zero return code. The current state
    /// is unchanged and the event was consumed.
    GuardDenied(u8),
    /// The machine is in a final state. No event was popped; stepping a
    /// terminated machine leaves the queue untouched.
    Terminated,
}

/// Lifecycle of the machine itself, distinct from the states it runs.
///
/// `Idle` is the post-build, pre-step phase; the first step performs the
/// implied initial transition and moves to `Running`. Termination is not a
/// separate phase: it is `Running` with the current leaf flagged final, which
/// makes [`Machine::reset`] a plain return to `Idle` from anywhere.
enum Lifecycle {
    Idle,
    Running { current: usize },
}

/// What the resolver found for a popped event.
enum Resolution<'a> {
    /// A transition matched and its guard (if any) allowed it.
    Take(&'a Transition<'a>),
    /// At least one transition matched but every matching candidate that was
    /// evaluated was denied; carries the last guard's denial code.
    Denied(u8),
    /// No transition on the ancestor chain is triggered by this event.
    NoMatch,
}

/// A hierarchical state machine.
///
/// `N` is the state-capacity bound for the resolved link table (at least the
/// number of declared states); `Q` is the event queue capacity. The machine
/// borrows the state slice and the queue for its whole lifetime; the caller
/// must not mutate the state declarations once the machine is built.
pub struct Machine<'a, const N: usize, const Q: usize> {
    states: &'a [State<'a>],
    topology: Topology<N>,
    lifecycle: Lifecycle,
    queue: &'a mut EventQueue<Q>,
}

impl<'a, const N: usize, const Q: usize> Machine<'a, N, Q> {
    /// Validates the topology, resolves all cross-references and returns a
    /// machine in the idle phase (no current state until the first step).
    ///
    /// # Panics
    ///
    /// Panics if the state hierarchy violates any of the constraints listed
    /// in the crate documentation. A broken topology cannot be driven
    /// correctly, so this is deliberately fatal.
    pub fn new(states: &'a [State<'a>], queue: &'a mut EventQueue<Q>) -> Self {
        let topology = Topology::resolve(states);
        Self {
            states,
            topology,
            lifecycle: Lifecycle::Idle,
            queue,
        }
    }

    /// Copies `event` into the machine's queue. Returns `false` if the queue
    /// is full; the event is then lost and resubmission is the caller's
    /// responsibility.
    pub fn post(&mut self, event: &Event) -> bool {
        self.queue.push(event)
    }

    /// Executes one step: pops at most one event and runs at most one
    /// transition.
    ///
    /// The first step after [`Machine::new`] (or after [`Machine::reset`])
    /// consumes no event: it enters the root's initial sub-state and descends
    /// through `initial` references to the childmost one, running entry
    /// actions on the way down.
    pub fn step(&mut self) -> StepOutcome {
        let current = match self.lifecycle {
            Lifecycle::Idle => {
                let root = self.topology.root();
                self.enter_childmost(root);
                #[cfg(feature = "debug-log")]
                log::debug!(
                    "entered initial configuration, current state id {:?}",
                    self.current()
                );
                return StepOutcome::Transitioned;
            }
            Lifecycle::Running { current } => current,
        };

        if self.states[current].is_final {
            return StepOutcome::Terminated;
        }

        let Some(event) = self.queue.pop() else {
            return StepOutcome::Empty;
        };

        match self.resolve(current, &event) {
            Resolution::NoMatch => {
                #[cfg(feature = "debug-log")]
                log::trace!("event id {} discarded", event.id);
                StepOutcome::Discarded
            }
            Resolution::Denied(code) => {
                #[cfg(feature = "debug-log")]
                log::debug!("event id {} denied by guard (code {code})", event.id);
                StepOutcome::GuardDenied(code)
            }
            Resolution::Take(transition) => {
                let target = topology::index_of(self.states, transition.target)
                    .expect("transition target was resolved during validation");
                if target == current {
                    self.run_self_transition(current, transition, &event);
                } else {
                    self.run_transition(current, target, transition, &event);
                }
                #[cfg(feature = "debug-log")]
                log::trace!(
                    "event id {} moved machine to state id {:?}",
                    event.id,
                    self.current()
                );
                StepOutcome::Transitioned
            }
        }
    }

    /// Returns the machine to its post-build, pre-step condition. The
    /// topology stays resolved and the event queue keeps its contents; drain
    /// the queue separately if a fully fresh start is needed.
    pub fn reset(&mut self) {
        self.lifecycle = Lifecycle::Idle;
    }

    /// Discards all pending events. The queue is borrowed by the machine for
    /// its whole lifetime, so this is the only way to drain it externally;
    /// combined with [`Machine::reset`] it gives a fully fresh start.
    pub fn clear_events(&mut self) {
        self.queue.clear();
    }

    /// The current leaf state, or `None` before the first step.
    pub fn current(&self) -> Option<StateId> {
        match self.lifecycle {
            Lifecycle::Idle => None,
            Lifecycle::Running { current } => Some(self.states[current].id),
        }
    }

    /// Whether the machine has reached a final state.
    pub fn is_terminated(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Running { current } if self.states[current].is_final)
    }

    /// Number of events waiting in the queue.
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Walks the ancestor chain from the current leaf outward, scanning each
    /// state's transitions in declaration order for the event id.
    ///
    /// When a matching transition is guarded and the guard denies it, the
    /// scan continues with later transitions and outer states; the last
    /// denial code is reported if nothing ends up matching. This fall-through
    /// allows several same-event transitions with complementary guards on one
    /// state.
    fn resolve(&self, current: usize, event: &Event) -> Resolution<'a> {
        let states = self.states;
        let root = self.topology.root();
        let mut denied: u8 = 0;

        // The root has no transitions by invariant, so stop below it.
        let mut state = current;
        while state != root {
            for transition in states[state].transitions {
                if transition.event != event.id {
                    continue;
                }
                match transition.guard {
                    None => return Resolution::Take(transition),
                    Some(guard) => {
                        denied = guard(event);
                        if denied == 0 {
                            return Resolution::Take(transition);
                        }
                    }
                }
            }
            match self.topology.parent_of(state) {
                Some(parent) => state = parent,
                None => break,
            }
        }

        if denied != 0 {
            Resolution::Denied(denied)
        } else {
            Resolution::NoMatch
        }
    }

    /// Executes a transition whose target is the current state.
    ///
    /// An external self-transition exits and re-enters the state around the
    /// transition action; an internal one runs the action alone.
    fn run_self_transition(&mut self, current: usize, transition: &Transition<'_>, event: &Event) {
        let states = self.states;
        let external = transition.kind == TransitionKind::External;

        if external {
            if let Some(exit) = states[current].on_exit {
                exit(&mut *self.queue);
            }
        }
        if let Some(action) = transition.action {
            action(event, &mut *self.queue);
        }
        if external {
            if let Some(entry) = states[current].on_entry {
                entry(&mut *self.queue);
            }
        }
    }

    /// Executes a transition to a different state: exit cascade up to the
    /// lowest common ancestor, transition action, entry cascade down to the
    /// target, then descent to the target's childmost initial descendant.
    fn run_transition(
        &mut self,
        current: usize,
        target: usize,
        transition: &Transition<'_>,
        event: &Event,
    ) {
        let states = self.states;

        // Ancestor chain of the target, childmost first, root last.
        let mut target_chain: Vec<usize, MAX_CHAIN> = Vec::new();
        let mut iter = target;
        loop {
            target_chain
                .push(iter)
                .expect("nesting bound was checked during validation");
            match self.topology.parent_of(iter) {
                Some(parent) => iter = parent,
                None => break,
            }
        }

        // The LCA is the first state on the target's chain that also lies on
        // the current state's chain. The root terminates both chains, so the
        // search cannot fail; either endpoint may itself be the LCA when one
        // state encloses the other.
        let mut lca_index = target_chain.len() - 1;
        'search: for (i, &candidate) in target_chain.iter().enumerate() {
            let mut state = current;
            loop {
                if state == candidate {
                    lca_index = i;
                    break 'search;
                }
                match self.topology.parent_of(state) {
                    Some(parent) => state = parent,
                    None => break,
                }
            }
        }
        let lca = target_chain[lca_index];

        // Exit cascade, innermost first. The LCA itself is not exited.
        let mut state = current;
        while state != lca {
            if let Some(exit) = states[state].on_exit {
                exit(&mut *self.queue);
            }
            match self.topology.parent_of(state) {
                Some(parent) => state = parent,
                None => break,
            }
        }

        if let Some(action) = transition.action {
            action(event, &mut *self.queue);
        }

        // Entry cascade, outermost first, from just below the LCA down to and
        // including the target. The LCA itself is not entered.
        for i in (0..lca_index).rev() {
            if let Some(entry) = states[target_chain[i]].on_entry {
                entry(&mut *self.queue);
            }
        }

        self.enter_childmost(target);
    }

    /// Descends from `from` through `initial` references until a state with
    /// no initial sub-state is reached, running each descended-into state's
    /// entry action; that leaf becomes the current state.
    ///
    /// `from`'s own entry action is not run here: on the implied first
    /// transition the root is never entered, and on a regular transition the
    /// target's entry already ran in the entry cascade.
    fn enter_childmost(&mut self, from: usize) {
        let states = self.states;
        let mut current = from;
        while let Some(initial) = self.topology.initial_of(current) {
            current = initial;
            if let Some(entry) = states[initial].on_entry {
                entry(&mut *self.queue);
            }
        }
        self.lifecycle = Lifecycle::Running { current };
    }
}
