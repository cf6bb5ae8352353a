//! Append-only scrollback for a session

use chrono::{DateTime, Local};

use crate::error::ResourceError;

/// Starting number of entry slots for a fresh log
pub const DEFAULT_HISTORY_CAPACITY: usize = 500;

/// Classification applied to each scrollback line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Captured command output and engine messages
    Output,
    /// Timestamped echo of a submitted command
    Command,
    /// Banner and usage text, rendered without highlighting
    Raw,
}

/// A single scrollback line
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub text: String,
    pub kind: LineKind,
    pub timestamp: DateTime<Local>,
}

/// Ordered scrollback with a scroll offset (0 = pinned to newest)
#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    capacity: usize,
    scroll_offset: usize,
    preserve_line_breaks: bool,
}

impl HistoryLog {
    pub fn new(preserve_line_breaks: bool) -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY, preserve_line_breaks)
    }

    pub fn with_capacity(capacity: usize, preserve_line_breaks: bool) -> Self {
        let capacity = capacity.max(1);
        let mut entries = Vec::new();
        if entries.try_reserve_exact(capacity).is_err() {
            ResourceError::HistoryInit.abort();
        }

        Self {
            entries,
            capacity,
            scroll_offset: 0,
            preserve_line_breaks,
        }
    }

    /// Append a line, doubling the backing storage when it is exhausted.
    ///
    /// Growth failure terminates the process.
    pub fn append(&mut self, text: impl Into<String>, kind: LineKind) {
        if self.entries.len() >= self.capacity {
            self.grow();
        }

        let mut text = text.into();
        if !self.preserve_line_breaks && text.contains(['\n', '\r']) {
            text = text.replace(['\n', '\r'], " ");
        }

        self.entries.push(HistoryEntry {
            text,
            kind,
            timestamp: Local::now(),
        });
    }

    fn grow(&mut self) {
        let doubled = self.capacity.saturating_mul(2);
        let additional = doubled - self.entries.len();
        if self.entries.try_reserve_exact(additional).is_err() {
            ResourceError::HistoryGrowth.abort();
        }
        self.capacity = doubled;
    }

    pub fn scroll_up(&mut self) {
        if self.scroll_offset + 1 < self.entries.len() {
            self.scroll_offset += 1;
        }
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
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

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Most recent entry, mostly useful for assertions
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }
}
