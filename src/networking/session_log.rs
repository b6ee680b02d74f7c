use crate::time::format_log_time;
use std::collections::VecDeque;
use tracing::{event, Level};

/// Bounded, human-readable history of what happened on a session.
/// Newest entry first; the oldest entries fall off once `capacity` is reached.
/// Every entry is mirrored to `tracing` at the level it was recorded with.
#[derive(Debug, Clone)]
pub struct SessionLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl SessionLog {
    pub fn new(capacity: usize) -> Self {
        SessionLog {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, level: Level, message: &str) {
        match level {
            Level::ERROR => event!(Level::ERROR, "{}", message),
            Level::WARN => event!(Level::WARN, "{}", message),
            Level::INFO => event!(Level::INFO, "{}", message),
            Level::DEBUG => event!(Level::DEBUG, "{}", message),
            _ => event!(Level::TRACE, "{}", message),
        }

        if self.capacity == 0 {
            return;
        }
        self.entries
            .push_front(format!("[{}] {}", format_log_time(), message));
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when any entry contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|entry| entry.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_log_is_bounded_and_newest_first_test() {
        let mut log = SessionLog::new(3);
        for i in 0..5 {
            log.push(Level::INFO, &format!("event {}", i));
        }
        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].ends_with("event 4"));
        assert!(entries[2].ends_with("event 2"));
        assert!(!log.contains("event 1"));

        // [HH:MM:SS] prefix
        assert_eq!(&entries[0][..1], "[");
        assert_eq!(&entries[0][9..11], "] ");
    }

    #[test]
    fn zero_capacity_log_keeps_nothing_test() {
        let mut log = SessionLog::new(0);
        log.push(Level::WARN, "dropped");
        assert!(log.is_empty());
    }
}
