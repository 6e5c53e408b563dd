//! # Bounded replay history.
//!
//! [`History`] retains the most recent events of a group so a late or
//! reconnecting subscriber can catch up before it starts receiving
//! live traffic. The buffer is a fixed-capacity FIFO ring: the length
//! never exceeds the limit, the oldest event is evicted first, and a
//! limit of zero disables retention entirely.

use std::collections::VecDeque;

use crate::events::Event;

/// FIFO ring of the most recent events, owned by the group coordinator.
pub(crate) struct History {
    events: VecDeque<Event>,
    limit: usize,
}

impl History {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Pushes an event, evicting from the front while over the limit.
    pub(crate) fn append(&mut self, event: Event) {
        self.events.push_back(event);
        while self.events.len() > self.limit {
            self.events.pop_front();
        }
    }

    /// Returns the retained events a subscriber still needs.
    ///
    /// An empty `last_event_id` yields the full retained sequence. A
    /// matching id yields everything strictly after it. An id that
    /// matches nothing (evicted or never seen) falls back to the full
    /// sequence: over-delivery is preferred to a silent gap.
    pub(crate) fn since(&self, last_event_id: &str) -> impl Iterator<Item = &Event> {
        let start = if last_event_id.is_empty() {
            0
        } else {
            match self.events.iter().position(|ev| ev.id == last_event_id) {
                Some(found) => found + 1,
                None => 0,
            }
        };
        self.events.iter().skip(start)
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(id: &str) -> Event {
        Event::message(format!("payload {id}")).with_id(id)
    }

    fn ids<'a>(iter: impl Iterator<Item = &'a Event>) -> Vec<&'a str> {
        iter.map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_never_exceeds_limit_and_keeps_most_recent() {
        let mut history = History::new(3);
        for n in 1..=10 {
            history.append(ev(&n.to_string()));
            assert!(history.len() <= 3);
        }
        assert_eq!(ids(history.since("")), vec!["8", "9", "10"]);
    }

    #[test]
    fn test_empty_id_returns_everything() {
        let mut history = History::new(5);
        history.append(ev("a"));
        history.append(ev("b"));
        assert_eq!(ids(history.since("")), vec!["a", "b"]);
    }

    #[test]
    fn test_known_id_returns_strictly_after() {
        let mut history = History::new(5);
        for id in ["a", "b", "c", "d"] {
            history.append(ev(id));
        }
        assert_eq!(ids(history.since("b")), vec!["c", "d"]);
        assert!(ids(history.since("d")).is_empty());
    }

    #[test]
    fn test_unknown_id_falls_back_to_everything() {
        let mut history = History::new(3);
        for id in ["a", "b", "c"] {
            history.append(ev(id));
        }
        // "z" was never retained; an evicted id behaves the same way.
        assert_eq!(ids(history.since("z")), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_zero_limit_disables_history() {
        let mut history = History::new(0);
        history.append(ev("a"));
        history.append(ev("b"));
        assert_eq!(history.len(), 0);
        assert!(ids(history.since("")).is_empty());
    }
}
