//! Bounded, newest-first event log.

use dispatch_core::{Algorithm, NodeStatus};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

/// Something worth showing to an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    Assigned { user: u64, node: String },
    NodeAdded { name: String, weight: u32 },
    NodeRemoved { name: String },
    WeightUpdated { name: String, weight: u32 },
    StatusChanged { name: String, status: NodeStatus },
    AlgorithmSwitched(Algorithm),
    Error(String),
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEvent::Assigned { user, node } => write!(f, "User #{} assigned to Node {}.", user, node),
            LogEvent::NodeAdded { name, weight } => {
                write!(f, "Control: New server \"{}\" added with weight {}.", name, weight)
            }
            LogEvent::NodeRemoved { name } => write!(f, "Control: Server \"{}\" removed.", name),
            LogEvent::WeightUpdated { name, weight } => {
                write!(f, "Control: Updated {} weight to {}.", name, weight)
            }
            LogEvent::StatusChanged { name, status } => {
                write!(f, "Control: Server \"{}\" is now {}.", name, status)
            }
            LogEvent::AlgorithmSwitched(algorithm) => {
                write!(f, "Control: Algorithm switched to {}.", algorithm.label())
            }
            LogEvent::Error(message) => write!(f, "Error: {}", message),
        }
    }
}

/// Log event stamped with the simulation clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub at: Duration,
    pub event: LogEvent,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.at.as_millis();
        write!(
            f,
            "[{:02}:{:02}.{:03}] {}",
            millis / 60_000,
            millis / 1000 % 60,
            millis % 1000,
            self.event
        )
    }
}

#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record an event, dropping the oldest one when full.
    pub fn push(&mut self, at: Duration, event: LogEvent) {
        self.entries.push_front(LogEntry { at, event });
        self.entries.truncate(self.capacity);
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_newest_first() {
        let mut log = EventLog::new(3);
        for user in 1..=5 {
            log.push(Duration::from_secs(user), LogEvent::Assigned { user, node: "Titan".into() });
        }
        assert_eq!(log.len(), 3);
        let users: Vec<String> = log.iter().map(|e| e.event.to_string()).collect();
        assert_eq!(
            users,
            vec![
                "User #5 assigned to Node Titan.",
                "User #4 assigned to Node Titan.",
                "User #3 assigned to Node Titan.",
            ]
        );
    }

    #[test]
    fn test_entry_format() {
        let entry = LogEntry {
            at: Duration::from_millis(62_005),
            event: LogEvent::NodeAdded { name: "Scout C".into(), weight: 2 },
        };
        assert_eq!(
            entry.to_string(),
            "[01:02.005] Control: New server \"Scout C\" added with weight 2."
        );
        let switched = LogEvent::AlgorithmSwitched(Algorithm::ConsistentHash);
        assert_eq!(switched.to_string(), "Control: Algorithm switched to Consistent Hashing.");
    }
}
