//! Queue of unheard events awaiting a matching subscriber.

use herald_core::{Event, kind};
use std::collections::VecDeque;

/// FIFO buffer of events published while nobody listened.
///
/// Timer events are never held. Disabling holding discards the queue
/// without replaying anything.
#[derive(Debug, Default)]
pub struct HeldQueue {
    holding: bool,
    events: VecDeque<Event>,
}

impl HeldQueue {
    /// Create an empty queue.
    pub fn new(holding: bool) -> Self {
        Self {
            holding,
            events: VecDeque::new(),
        }
    }

    /// Keep `event` for later replay, or hand it back when it cannot be held.
    pub fn try_hold(&mut self, event: Event) -> Option<Event> {
        if !self.holding || event.is_timer() {
            return Some(event);
        }
        self.events.push_back(event);
        None
    }

    /// Remove, in FIFO order, every event reachable under `identity`.
    ///
    /// `all` and `any` match every held event.
    pub fn take_matching(&mut self, identity: &str) -> Vec<Event> {
        let everything = identity == kind::ALL || identity == kind::ANY;
        let mut taken = Vec::new();
        let mut kept = VecDeque::with_capacity(self.events.len());
        for event in self.events.drain(..) {
            if everything || event.is_a(identity) {
                taken.push(event);
            } else {
                kept.push_back(event);
            }
        }
        self.events = kept;
        taken
    }

    /// Enable or disable holding. Disabling discards the queue and returns
    /// how many events were dropped.
    pub fn set_holding(&mut self, holding: bool) -> usize {
        self.holding = holding;
        if holding {
            return 0;
        }
        let dropped = self.events.len();
        self.events.clear();
        dropped
    }

    /// Whether unheard events are currently kept.
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Number of held events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no event is held.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Held events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::EventKind;

    #[test]
    fn test_not_holding_hands_event_back() {
        let mut queue = HeldQueue::new(false);
        assert!(queue.try_hold(Event::named("orphan")).is_some());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_timer_events_are_never_held() {
        let mut queue = HeldQueue::new(true);
        assert!(queue.try_hold(Event::timer()).is_some());
        assert!(queue.try_hold(Event::named("orphan")).is_none());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_take_matching_is_fifo_and_selective() {
        let mut queue = HeldQueue::new(true);
        queue.try_hold(Event::named("a").with("n", 1.into()));
        queue.try_hold(Event::named("b"));
        queue.try_hold(Event::new(EventKind::new("c").with_ancestor("a")));
        queue.try_hold(Event::named("a").with("n", 2.into()));

        let taken = queue.take_matching("a");
        let identities: Vec<&str> = taken.iter().map(Event::identity).collect();
        assert_eq!(identities, ["a", "c", "a"]);
        assert_eq!(taken[0].get("n"), Some(&1.into()));
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.take_matching("any").len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_disabling_discards() {
        let mut queue = HeldQueue::new(true);
        queue.try_hold(Event::named("x"));
        queue.try_hold(Event::named("y"));

        assert_eq!(queue.set_holding(false), 2);
        assert!(queue.is_empty());
        assert!(!queue.is_holding());
        assert_eq!(queue.set_holding(true), 0);
    }
}
