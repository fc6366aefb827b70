//! One-time validation and cross-reference resolution of a state hierarchy.
//!
//! The caller declares states as a flat slice with id-based references; this
//! module turns those into an index-based link table (one owned arena slot per
//! state) and rejects every malformed configuration up front. A broken
//! topology cannot be driven correctly afterwards, so every violation is a
//! panic: misconfiguration must be caught before commissioning, not reported
//! back at runtime.

use heapless::Vec;

use crate::state::{MAX_NESTED_DEPTH, State, StateId};

/// Resolved cross-references of one state, by index into the state slice.
#[derive(Debug, Clone, Copy)]
struct Link {
    parent: Option<usize>,
    initial: Option<usize>,
}

/// Index-based view of a validated state hierarchy.
///
/// `N` is the state capacity chosen by the caller; it must be at least the
/// number of declared states.
pub(crate) struct Topology<const N: usize> {
    links: Vec<Link, N>,
    root: usize,
}

/// Finds the index of the state with the given id, scanning in declaration
/// order.
pub(crate) fn index_of(states: &[State<'_>], id: StateId) -> Option<usize> {
    states.iter().position(|state| state.id == id)
}

impl<const N: usize> Topology<N> {
    /// Validates `states` and resolves all id references into indices.
    ///
    /// # Panics
    ///
    /// Panics if the hierarchy violates any of the constraints listed in the
    /// crate documentation.
    pub(crate) fn resolve(states: &[State<'_>]) -> Self {
        assert!(!states.is_empty(), "state machine has no states");
        assert!(
            states.len() <= N,
            "state machine has {} states but capacity is {N}",
            states.len()
        );

        let mut links: Vec<Link, N> = Vec::new();
        let mut root: Option<usize> = None;

        for (index, state) in states.iter().enumerate() {
            // Ids must be unique.
            for other in &states[index + 1..] {
                assert!(
                    other.id != state.id,
                    "duplicate state id {}",
                    state.id.0
                );
            }

            let parent = match state.parent {
                None => {
                    assert!(
                        root.is_none(),
                        "more than one root state (state id {})",
                        state.id.0
                    );
                    root = Some(index);
                    None
                }
                Some(parent_id) => {
                    let parent = index_of(states, parent_id);
                    assert!(
                        parent.is_some(),
                        "state id {} has unknown parent id {}",
                        state.id.0,
                        parent_id.0
                    );
                    parent
                }
            };

            let initial = match state.initial {
                None => None,
                Some(initial_id) => {
                    let initial = index_of(states, initial_id);
                    assert!(
                        initial.is_some(),
                        "state id {} has unknown initial id {}",
                        state.id.0,
                        initial_id.0
                    );
                    initial
                }
            };

            // Capacity was checked above, so this cannot fail.
            let _ = links.push(Link { parent, initial });
        }

        let root = root.expect("state machine has no root state");
        assert!(
            states[root].initial.is_some(),
            "root state (id {}) has no initial sub-state",
            states[root].id.0
        );
        assert!(
            states[root].transitions.is_empty(),
            "root state (id {}) must not have outgoing transitions",
            states[root].id.0
        );

        for (index, state) in states.iter().enumerate() {
            // An initial sub-state must point back at its composite.
            if let Some(initial) = links[index].initial {
                assert!(
                    links[initial].parent == Some(index),
                    "initial sub-state (id {}) of state id {} has a different parent",
                    states[initial].id.0,
                    state.id.0
                );
            }

            // Every non-root state must reach the root within the nesting
            // bound. This also rejects parent cycles.
            if index != root {
                let mut iter = index;
                let mut reaches_root = false;
                for _ in 0..MAX_NESTED_DEPTH {
                    match links[iter].parent {
                        Some(parent) if parent == root => {
                            reaches_root = true;
                            break;
                        }
                        Some(parent) => iter = parent,
                        None => break,
                    }
                }
                assert!(
                    reaches_root,
                    "state id {} is nested deeper than {MAX_NESTED_DEPTH} levels",
                    state.id.0
                );
            }

            for transition in state.transitions {
                let target = index_of(states, transition.target);
                assert!(
                    target.is_some(),
                    "transition from state id {} targets unknown state id {}",
                    state.id.0,
                    transition.target.0
                );
                assert!(
                    target != Some(root),
                    "transition from state id {} targets the root state",
                    state.id.0
                );
            }
        }

        Self { links, root }
    }

    pub(crate) fn root(&self) -> usize {
        self.root
    }

    pub(crate) fn parent_of(&self, index: usize) -> Option<usize> {
        self.links[index].parent
    }

    pub(crate) fn initial_of(&self, index: usize) -> Option<usize> {
        self.links[index].initial
    }
}
