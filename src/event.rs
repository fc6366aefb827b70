//! Event records consumed by the state machine engine.

/// Number of numeric parameters carried by every event.
pub const EVENT_PARAMS: usize = 2;

/// Identifier of an event, unique within one state machine's vocabulary.
pub type EventId = u8;

/// A fixed-size event record.
///
/// Events are copied by value into and out of the [`EventQueue`](crate::EventQueue);
/// the submitter keeps ownership of its own copy. The `params` payload is
/// opaque to the engine and only interpreted by guards and actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Event {
    pub id: EventId,
    pub params: [u32; EVENT_PARAMS],
}

impl Event {
    /// An event with no parameters.
    #[must_use]
    pub const fn new(id: EventId) -> Self {
        Self {
            id,
            params: [0; EVENT_PARAMS],
        }
    }

    #[must_use]
    pub const fn with_params(id: EventId, params: [u32; EVENT_PARAMS]) -> Self {
        Self { id, params }
    }
}
