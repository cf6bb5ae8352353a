//! Single-line editor with a bounded command history

use std::collections::VecDeque;

/// Maximum number of characters in the edit buffer
pub const DEFAULT_MAX_INPUT: usize = 512;

/// Number of submitted commands remembered per session
pub const DEFAULT_HISTORY_CAPACITY: usize = 256;

/// Abstract edit operations produced by the key decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    HistoryBack,
    HistoryForward,
}

/// Edit buffer, cursor and command-history navigation for one session
#[derive(Debug, Clone)]
pub struct InputEditor {
    buffer: Vec<char>,
    cursor: usize,
    display_start: usize,
    max_len: usize,
    history: VecDeque<String>,
    history_capacity: usize,
    /// `history.len()` means "editing fresh text"
    history_pos: usize,
    locked: bool,
}

impl InputEditor {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_INPUT, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_limits(max_len: usize, history_capacity: usize) -> Self {
        Self {
            buffer: Vec::new(),
            cursor: 0,
            display_start: 0,
            max_len: max_len.max(1),
            history: VecDeque::new(),
            history_capacity: history_capacity.max(1),
            history_pos: 0,
            locked: false,
        }
    }

    /// Apply an edit. Returns `true` if the buffer or cursor changed.
    ///
    /// Every edit is ignored while the editor is locked.
    pub fn apply(&mut self, action: EditAction) -> bool {
        if self.locked {
            return false;
        }

        match action {
            EditAction::Insert(c) => self.insert(c),
            EditAction::Backspace => {
                if self.cursor == 0 {
                    return false;
                }
                self.cursor -= 1;
                self.buffer.remove(self.cursor);
                true
            }
            EditAction::Delete => {
                if self.cursor >= self.buffer.len() {
                    return false;
                }
                self.buffer.remove(self.cursor);
                true
            }
            EditAction::Left => {
                if self.cursor == 0 {
                    return false;
                }
                self.cursor -= 1;
                true
            }
            EditAction::Right => {
                if self.cursor >= self.buffer.len() {
                    return false;
                }
                self.cursor += 1;
                true
            }
            EditAction::Home => {
                self.cursor = 0;
                self.display_start = 0;
                true
            }
            EditAction::End => {
                self.cursor = self.buffer.len();
                true
            }
            EditAction::HistoryBack => self.history_back(),
            EditAction::HistoryForward => self.history_forward(),
        }
    }

    fn insert(&mut self, c: char) -> bool {
        if c.is_control() || self.buffer.len() >= self.max_len {
            return false;
        }
        self.buffer.insert(self.cursor, c);
        self.cursor += 1;
        true
    }

    fn history_back(&mut self) -> bool {
        if self.history_pos == 0 {
            return false;
        }
        self.history_pos -= 1;
        self.load_history_entry();
        true
    }

    fn history_forward(&mut self) -> bool {
        let len = self.history.len();
        if self.history_pos + 1 < len {
            self.history_pos += 1;
            self.load_history_entry();
            true
        } else if self.history_pos + 1 == len {
            self.history_pos = len;
            self.clear_buffer();
            true
        } else {
            false
        }
    }

    fn load_history_entry(&mut self) {
        if let Some(entry) = self.history.get(self.history_pos) {
            self.buffer = entry.chars().take(self.max_len).collect();
            self.cursor = self.buffer.len();
        }
    }

    fn clear_buffer(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.display_start = 0;
    }

    /// Take the current line for execution and reset the editor.
    ///
    /// Returns `None` when locked or when the line is empty.
    pub fn submit(&mut self) -> Option<String> {
        if self.locked || self.buffer.is_empty() {
            return None;
        }

        let line: String = self.buffer.iter().collect();
        self.clear_buffer();
        self.history_pos = self.history.len();
        Some(line)
    }

    /// Record a command unless it repeats the most recent entry
    pub fn remember(&mut self, command: &str) {
        if self.history.back().is_some_and(|last| last == command) {
            self.history_pos = self.history.len();
            return;
        }

        if self.history.len() >= self.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(command.to_string());
        self.history_pos = self.history.len();
    }

    /// Slide the display window so the cursor stays inside `width` columns.
    ///
    /// Returns the visible slice and the cursor column within it.
    pub fn visible_window(&mut self, width: usize) -> (String, usize) {
        let width = width.max(1);
        let len = self.buffer.len();

        if len <= width {
            self.display_start = 0;
        } else if self.display_start + width > len {
            self.display_start = len - width;
        }

        if self.cursor < self.display_start {
            self.display_start = self.cursor;
        } else if self.cursor - self.display_start >= width {
            self.display_start = self.cursor + 1 - width;
        }

        let end = (self.display_start + width).min(len);
        let visible = self.buffer[self.display_start..end].iter().collect();
        (visible, self.cursor - self.display_start)
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn text(&self) -> String {
        self.buffer.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn display_start(&self) -> usize {
        self.display_start
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_pos(&self) -> usize {
        self.history_pos
    }
}

impl Default for InputEditor {
    fn default() -> Self {
        Self::new()
    }
}
