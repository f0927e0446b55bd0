//! EventQueue - turns asynchronous input into discrete events, consumed once per frame.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use crate::Vector2;

/// Input events, as produced by the key / pointer handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumIter)]
pub enum EventTag {
    MoveForward,
    MoveBackward,
    TurnLeft,
    TurnRight,
    Decelerate,
    StopTurning,
    /// Pointer moved; carries the pointer position, not used by the movement physics.
    PointerMove,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameEvent {
    tag: EventTag,
    point: Option<Vector2>,
    timestamp: Instant,
}

impl GameEvent {
    #[inline]
    pub fn new(tag: EventTag) -> Self {
        Self::at(tag, None, Instant::now())
    }

    #[inline]
    pub fn with_point(tag: EventTag, point: Vector2) -> Self {
        Self::at(tag, Some(point), Instant::now())
    }

    /// Event with an explicit capture time (e.g. the timestamp of the raw input event).
    #[inline]
    pub fn at(tag: EventTag, point: Option<Vector2>, timestamp: Instant) -> Self {
        Self { tag, point, timestamp }
    }

    #[inline]
    pub fn tag(&self) -> EventTag {
        self.tag
    }

    #[inline]
    pub fn point(&self) -> Option<Vector2> {
        self.point
    }

    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }
}

/// Multi-producer / single-consumer priority queue, ordered by event timestamp.
/// Producers push from any thread; the frame loop drains everything once per tick.
#[derive(Default)]
pub struct EventQueue {
    heap: Mutex<BinaryHeap<Reverse<Queued>>>,
    seq: AtomicU64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new event, stamped with the current time.
    #[inline]
    pub fn push(&self, tag: EventTag) {
        self.push_event(GameEvent::new(tag));
    }

    pub fn push_event(&self, event: GameEvent) {
        let seq = self.seq.fetch_add(1, AtomicOrdering::Relaxed);
        self.lock().push(Reverse(Queued { event, seq }));
    }

    /// Take all the queued events, oldest first.
    /// Events pushed while the caller processes the result stay queued for the next drain.
    pub fn drain(&self) -> Vec<GameEvent> {
        let mut heap = std::mem::take(&mut *self.lock());
        let mut events = Vec::with_capacity(heap.len());
        while let Some(Reverse(q)) = heap.pop() {
            events.push(q.event);
        }
        events
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    //------------------

    #[inline]
    fn lock(&self) -> MutexGuard<'_, BinaryHeap<Reverse<Queued>>> {
        // the heap is always left in a valid state, so a poisoned lock is still usable
        self.heap.lock().unwrap_or_else(|e| e.into_inner())
    }
}

//---------------------------
//  Internal stuff

struct Queued {
    event: GameEvent,
    seq: u64,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        self.event
            .timestamp
            .cmp(&other.event.timestamp)
            .then(self.seq.cmp(&other.seq))
    }
}

//---------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn drains_in_timestamp_order_not_arrival_order() {
        let q = EventQueue::new();
        let t0 = Instant::now();
        q.push_event(GameEvent::at(EventTag::TurnLeft, None, t0 + Duration::from_millis(20)));
        q.push_event(GameEvent::at(EventTag::MoveForward, None, t0));
        q.push_event(GameEvent::at(EventTag::Decelerate, None, t0 + Duration::from_millis(10)));

        let tags: Vec<_> = q.drain().iter().map(|e| e.tag()).collect();
        assert_eq!(tags, vec![EventTag::MoveForward, EventTag::Decelerate, EventTag::TurnLeft]);
        assert!(q.is_empty());
    }

    #[test]
    fn events_pushed_after_drain_wait_for_next_frame() {
        let q = EventQueue::new();
        q.push(EventTag::MoveForward);
        let first = q.drain();
        q.push(EventTag::Decelerate);
        assert_eq!(first.len(), 1);
        assert_eq!(q.len(), 1);
        assert_eq!(q.drain()[0].tag(), EventTag::Decelerate);
    }

    #[test]
    fn pointer_payload_is_kept() {
        let q = EventQueue::new();
        q.push_event(GameEvent::with_point(EventTag::PointerMove, Vector2::new(3.0, 4.0)));
        let ev = q.drain();
        assert_eq!(ev[0].point(), Some(Vector2::new(3.0, 4.0)));
    }

    #[test]
    fn many_producers_lose_nothing() {
        let q = Arc::new(EventQueue::new());
        let producers: Vec<_> = (0..4)
            .map(|_| {
                let q = Arc::clone(&q);
                thread::spawn(move || {
                    for _ in 0..250 {
                        q.push(EventTag::TurnRight);
                    }
                })
            })
            .collect();
        for p in producers {
            p.join().unwrap();
        }

        let events = q.drain();
        assert_eq!(events.len(), 1000);
        assert!(events.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));
    }
}
