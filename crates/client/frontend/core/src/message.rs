//! Narration log shared by every frontend.
use std::collections::VecDeque;

pub use battle_runtime::MessageLevel;
use battle_runtime::NarrationEvent;

/// Snapshot of a single narration line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageEntry {
    pub text: String,
    pub level: MessageLevel,
}

impl MessageEntry {
    pub fn new(text: impl Into<String>, level: MessageLevel) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }
}

impl From<&NarrationEvent> for MessageEntry {
    fn from(event: &NarrationEvent) -> Self {
        Self::new(event.text.clone(), event.level)
    }
}

/// Bounded queue of narration lines; the oldest line falls off first.
#[derive(Clone, Debug)]
pub struct MessageLog {
    entries: VecDeque<MessageEntry>,
    capacity: usize,
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        let bounded_capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(bounded_capacity),
            capacity: bounded_capacity,
        }
    }

    /// Appends `entry`. Blank lines are dropped; returns whether it was kept.
    pub fn push(&mut self, entry: MessageEntry) -> bool {
        if entry.text.trim().is_empty() {
            return false;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        true
    }

    pub fn push_text(&mut self, message: impl Into<String>) -> bool {
        self.push(MessageEntry::new(message, MessageLevel::Info))
    }

    /// Newest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &MessageEntry> {
        self.entries.iter().rev().take(limit)
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &MessageEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lines joined the way a feed panel shows them.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
