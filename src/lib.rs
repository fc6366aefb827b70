// Copyright 2026 hsm-rt contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg_attr(not(feature = "std"), no_std)]

//! # hsm-rt
//!
//! Hierarchical state machines for embedded and real-time control, implementing
//! a constrained subset of UML 2.0 state machine diagrams: composite (nested)
//! states, initial sub-states, final states, event-triggered transitions with
//! guard conditions, and entry/exit/transition actions.
//!
//! Deliberately **not** implemented, because they are a poor fit for
//! embedded/real-time work:
//! - `do` activities (they would have to be evaluated on every step; an
//!   internal transition with an action does the same job and only runs when
//!   its event actually arrives);
//! - transitions triggered by a guard condition becoming true without an
//!   event (the condition would have to be re-evaluated on every step);
//! - orthogonal/concurrent regions.
//!
//! A state machine must satisfy the following constraints, checked once when
//! the machine is built ([`Machine::new`] panics if any is broken):
//! - state ids are unique;
//! - there is exactly one root state (the only state without a parent);
//! - the root state has an initial sub-state and no outgoing transitions;
//! - every `parent`/`initial` reference names an existing state;
//! - if state A declares B as its initial sub-state, B's parent is A;
//! - every state reaches the root within [`MAX_NESTED_DEPTH`] hops;
//! - every transition targets an existing, non-root state.
//!
//! The engine is single-threaded and cooperative: one driver loop repeatedly
//! calls [`Machine::step`], which pops at most one event from the lent
//! [`EventQueue`] and executes at most one transition. No allocation happens
//! after the machine is built.

pub mod event;
pub mod machine;
pub mod queue;
pub mod state;

mod topology;

pub use event::{EVENT_PARAMS, Event, EventId};
pub use machine::{Machine, StepOutcome};
pub use queue::{EventQueue, EventSink};
pub use state::{MAX_NESTED_DEPTH, State, StateId, Transition, TransitionKind};

// Re-exported for the `static_event_queue!` macro; not part of the public API.
#[doc(hidden)]
pub use static_cell;
