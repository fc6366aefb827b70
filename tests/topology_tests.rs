//! Every malformed topology must be rejected when the machine is built.
//!
//! Configuration errors are fatal by design: a broken hierarchy cannot be
//! driven correctly, so each case here expects a panic from `Machine::new`.

use hsm_rt::{EventQueue, Machine, State, StateId, Transition};

const ROOT: StateId = StateId(1);
const A: StateId = StateId(2);
const B: StateId = StateId(3);
const C: StateId = StateId(4);
const D: StateId = StateId(5);

fn build<const N: usize>(states: &[State<'_>]) {
    let mut queue: EventQueue<4> = EventQueue::new();
    let _machine: Machine<'_, N, 4> = Machine::new(states, &mut queue);
}

#[test]
#[should_panic(expected = "no states")]
fn rejects_empty_state_array() {
    build::<4>(&[]);
}

#[test]
#[should_panic(expected = "capacity")]
fn rejects_more_states_than_capacity() {
    let states = [State::root(ROOT, A), State::new(A, ROOT)];
    build::<1>(&states);
}

#[test]
#[should_panic(expected = "duplicate state id")]
fn rejects_duplicate_state_ids() {
    let states = [State::root(ROOT, A), State::new(A, ROOT), State::new(A, ROOT)];
    build::<4>(&states);
}

#[test]
#[should_panic(expected = "more than one root state")]
fn rejects_two_root_states() {
    let states = [State::root(ROOT, A), State::new(A, ROOT), State::root(B, A)];
    build::<4>(&states);
}

#[test]
#[should_panic(expected = "no root state")]
fn rejects_missing_root_state() {
    // A parent cycle with no parentless state anywhere.
    let states = [State::new(A, B), State::new(B, A)];
    build::<4>(&states);
}

#[test]
#[should_panic(expected = "no initial sub-state")]
fn rejects_root_without_initial() {
    let root = State {
        initial: None,
        ..State::root(ROOT, A)
    };
    let states = [root, State::new(A, ROOT)];
    build::<4>(&states);
}

#[test]
#[should_panic(expected = "must not have outgoing transitions")]
fn rejects_root_with_transitions() {
    let transitions = [Transition::on(1, A)];
    let states = [
        State::root(ROOT, A).with_transitions(&transitions),
        State::new(A, ROOT),
    ];
    build::<4>(&states);
}

#[test]
#[should_panic(expected = "unknown parent id")]
fn rejects_dangling_parent_reference() {
    let states = [State::root(ROOT, A), State::new(A, ROOT), State::new(B, D)];
    build::<4>(&states);
}

#[test]
#[should_panic(expected = "unknown initial id")]
fn rejects_dangling_initial_reference() {
    let states = [State::root(ROOT, A), State::new(A, ROOT).with_initial(D)];
    build::<4>(&states);
}

#[test]
#[should_panic(expected = "has a different parent")]
fn rejects_initial_whose_parent_is_not_the_composite() {
    // B is declared as A's initial sub-state but is parented to the root.
    let states = [
        State::root(ROOT, A),
        State::new(A, ROOT).with_initial(B),
        State::new(B, ROOT),
    ];
    build::<4>(&states);
}

#[test]
#[should_panic(expected = "nested deeper")]
fn rejects_nesting_beyond_the_bound() {
    // root -> A -> B -> C -> D is one level too deep.
    let states = [
        State::root(ROOT, A),
        State::new(A, ROOT).with_initial(B),
        State::new(B, A).with_initial(C),
        State::new(C, B).with_initial(D),
        State::new(D, C),
    ];
    build::<8>(&states);
}

#[test]
#[should_panic(expected = "targets unknown state id")]
fn rejects_dangling_transition_target() {
    let transitions = [Transition::on(1, D)];
    let states = [
        State::root(ROOT, A),
        State::new(A, ROOT).with_transitions(&transitions),
    ];
    build::<4>(&states);
}

#[test]
#[should_panic(expected = "targets the root state")]
fn rejects_transition_targeting_the_root() {
    let transitions = [Transition::on(1, ROOT)];
    let states = [
        State::root(ROOT, A),
        State::new(A, ROOT).with_transitions(&transitions),
    ];
    build::<4>(&states);
}

#[test]
fn accepts_a_maximally_nested_valid_hierarchy() {
    let transitions = [Transition::on(1, C)];
    let states = [
        State::root(ROOT, A),
        State::new(A, ROOT).with_initial(B),
        State::new(B, A).with_initial(C).with_transitions(&transitions),
        State::new(C, B),
    ];
    let mut queue: EventQueue<4> = EventQueue::new();
    let machine: Machine<'_, 4, 4> = Machine::new(&states, &mut queue);
    assert_eq!(machine.current(), None);
    assert!(!machine.is_terminated());
}
