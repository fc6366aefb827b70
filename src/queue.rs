//! Bounded, fixed-capacity event queue.
//!
//! The queue is owned by the caller and lent to a [`Machine`](crate::Machine)
//! for its whole lifetime. Both ends are non-blocking: pushing into a full
//! queue and popping from an empty queue report failure instead of waiting.

use heapless::Deque;

use crate::event::Event;

/// Write end of an event queue, as seen from inside an action callback.
///
/// While the engine runs an entry/exit/transition action, it lends the event
/// queue back into the callback through this trait. Pushing an event from
/// within an action is the supported way for a state machine to queue events
/// to itself.
pub trait EventSink {
    /// Copies `event` into the queue. Returns `false` if the queue is full.
    fn push(&mut self, event: &Event) -> bool;
}

/// Fixed-capacity FIFO of [`Event`] records.
///
/// `N` is the capacity in events. The queue never allocates; all storage is
/// inline, so it can live in a `static` (see [`static_event_queue!`]).
pub struct EventQueue<const N: usize> {
    items: Deque<Event, N>,
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EventQueue<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Deque::new(),
        }
    }

    /// Removes and returns the oldest event, or `None` if the queue is empty.
    pub fn pop(&mut self) -> Option<Event> {
        self.items.pop_front()
    }

    /// Number of events currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Maximum number of events the queue can hold.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.is_full()
    }

    /// Discards all queued events.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<const N: usize> EventSink for EventQueue<N> {
    fn push(&mut self, event: &Event) -> bool {
        self.items.push_back(*event).is_ok()
    }
}

/// Creates a statically-allocated event queue and returns a `'static mut`
/// handle to it.
///
/// The backing storage is a `static` initialized through
/// [`StaticCell`](static_cell::StaticCell), so no unsafe code is needed at the
/// call site and a second evaluation of the same declaration panics instead of
/// aliasing the storage.
///
/// ```rust,no_run
/// use hsm_rt::static_event_queue;
///
/// let queue = static_event_queue!(EVENT_QUEUE, 8);
/// assert_eq!(queue.capacity(), 8);
/// ```
#[macro_export]
macro_rules! static_event_queue {
    ($name:ident, $cap:expr) => {{
        static $name: $crate::static_cell::StaticCell<$crate::EventQueue<$cap>> =
            $crate::static_cell::StaticCell::new();
        $name.init($crate::EventQueue::new())
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_starts_empty() {
        let mut queue: EventQueue<4> = EventQueue::new();
        assert!(queue.is_empty());
        assert!(!queue.is_full());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.capacity(), 4);
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn queue_preserves_fifo_order() {
        let mut queue: EventQueue<4> = EventQueue::new();
        for id in 1..=3 {
            assert!(queue.push(&Event::new(id)));
        }
        assert_eq!(queue.len(), 3);
        for id in 1..=3 {
            assert_eq!(queue.pop(), Some(Event::new(id)));
        }
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn push_fails_when_full() {
        let mut queue: EventQueue<2> = EventQueue::new();
        assert!(queue.push(&Event::new(1)));
        assert!(queue.push(&Event::new(2)));
        assert!(queue.is_full());
        assert!(!queue.push(&Event::new(3)));

        // The rejected event must not have displaced anything.
        assert_eq!(queue.pop(), Some(Event::new(1)));
        assert_eq!(queue.pop(), Some(Event::new(2)));
    }

    #[test]
    fn clear_discards_everything() {
        let mut queue: EventQueue<4> = EventQueue::new();
        queue.push(&Event::new(7));
        queue.push(&Event::new(8));
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn events_are_copied_by_value() {
        let mut queue: EventQueue<2> = EventQueue::new();
        let mut event = Event::with_params(5, [10, 20]);
        assert!(queue.push(&event));
        event.params = [0, 0]; // mutating the original must not affect the queued copy
        assert_eq!(queue.pop(), Some(Event::with_params(5, [10, 20])));
    }
}
