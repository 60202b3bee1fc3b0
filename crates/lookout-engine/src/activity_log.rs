//! Bounded activity feed, newest entry first.

use std::collections::VecDeque;

use lookout_config::config::DEFAULT_ACTIVITY_LOG_CAPACITY;
use lookout_core::ActivityEvent;

/// Fixed-capacity event buffer ordered by insertion, most recent first.
///
/// When full, recording a new event silently drops the oldest one.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEvent>,
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVITY_LOG_CAPACITY)
    }
}

impl ActivityLog {
    /// Create a log holding at most `capacity` events (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record an event as the newest entry.
    pub fn push(&mut self, event: ActivityEvent) {
        self.entries.push_front(event);
        self.entries.truncate(self.capacity);
    }

    /// Record events in order; the last one ends up newest.
    pub fn extend(&mut self, events: impl IntoIterator<Item = ActivityEvent>) {
        for event in events {
            self.push(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from newest to oldest.
    pub fn to_vec(&self) -> Vec<ActivityEvent> {
        self.entries.iter().cloned().collect()
    }
}
