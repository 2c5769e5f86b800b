//! Fixed-capacity call history.

use std::collections::VecDeque;

use super::signature::CallSignature;

/// Number of recent calls kept for pattern detection.
pub const HISTORY_CAPACITY: usize = 10;

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub tool_name: String,
    pub signature: CallSignature,
}

/// Ring buffer of the most recent calls; pushing into a full buffer evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct CallHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl CallHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Entry `back` positions from the newest one (`from_back(1)` is the newest).
    pub fn from_back(&self, back: usize) -> Option<&HistoryEntry> {
        if back == 0 || back > self.entries.len() {
            return None;
        }
        self.entries.get(self.entries.len() - back)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for CallHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}
