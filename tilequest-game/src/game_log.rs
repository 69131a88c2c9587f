//! Bounded log of recent events.
use chrono::Local;
use std::collections::VecDeque;
use std::fmt;

use crate::constants::{DEFAULT_LOG_CAPACITY, LOG_TIMESTAMP_FORMAT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: String,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.timestamp, self.message)
    }
}

/// Ring of the most recent entries; the oldest is evicted past capacity.
#[derive(Debug, Clone)]
pub struct GameLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for GameLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl GameLog {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn add_entry(&mut self, message: impl Into<String>) {
        let timestamp = Local::now().format(LOG_TIMESTAMP_FORMAT).to_string();
        self.push(timestamp, message.into());
    }

    fn push(&mut self, timestamp: String, message: String) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry { timestamp, message });
    }

    /// The last `count` entries, oldest first.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<&LogEntry> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl fmt::Display for GameLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, entry) in self.entries.iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}
