//! Bounded FIFO of commands deferred while another command runs

use tracing::{debug, warn};

/// Fixed number of pending commands a session may hold
pub const COMMAND_QUEUE_CAPACITY: usize = 10;

/// Derived fill state of a queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Normal,
    Full,
}

/// Circular buffer of pending command strings
#[derive(Debug, Clone)]
pub struct CommandQueue {
    slots: [Option<String>; COMMAND_QUEUE_CAPACITY],
    head: usize,
    tail: usize,
    count: usize,
    state: QueueState,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            head: 0,
            tail: 0,
            count: 0,
            state: QueueState::Normal,
        }
    }

    /// Append a command at the tail.
    ///
    /// Returns `false` and leaves the queue `Full` when no slot is free.
    pub fn enqueue(&mut self, command: impl Into<String>) -> bool {
        if self.is_full() {
            self.state = QueueState::Full;
            warn!("Command queue full ({} pending)", self.count);
            return false;
        }

        self.slots[self.tail] = Some(command.into());
        self.tail = (self.tail + 1) % COMMAND_QUEUE_CAPACITY;
        self.count += 1;
        self.update_state();
        debug!("Queued command, depth {}", self.count);
        true
    }

    /// Remove the command at the head, if any
    pub fn dequeue(&mut self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let command = self.slots[self.head].take();
        self.head = (self.head + 1) % COMMAND_QUEUE_CAPACITY;
        self.count -= 1;
        self.update_state();
        command
    }

    fn update_state(&mut self) {
        self.state = if self.count >= COMMAND_QUEUE_CAPACITY {
            QueueState::Full
        } else {
            QueueState::Normal
        };
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count >= COMMAND_QUEUE_CAPACITY
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    /// Pending commands in execution order
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        (0..self.count).filter_map(move |offset| {
            self.slots[(self.head + offset) % COMMAND_QUEUE_CAPACITY].as_deref()
        })
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = CommandQueue::new();
        assert!(queue.enqueue("first"));
        assert!(queue.enqueue("second"));

        assert_eq!(queue.dequeue().as_deref(), Some("first"));
        assert_eq!(queue.dequeue().as_deref(), Some("second"));
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_full_state_transitions() {
        let mut queue = CommandQueue::new();
        for i in 0..COMMAND_QUEUE_CAPACITY {
            assert_eq!(queue.state(), QueueState::Normal);
            assert!(queue.enqueue(format!("cmd {i}")));
        }
        assert_eq!(queue.state(), QueueState::Full);
        assert!(!queue.enqueue("overflow"));
        assert_eq!(queue.len(), COMMAND_QUEUE_CAPACITY);
        assert_eq!(queue.state(), QueueState::Full);

        assert_eq!(queue.dequeue().as_deref(), Some("cmd 0"));
        assert_eq!(queue.state(), QueueState::Normal);
    }

    #[test]
    fn test_count_bounded_under_mixed_operations() {
        let mut queue = CommandQueue::new();
        // Deterministic interleaving that wraps head/tail several times
        for step in 0..200usize {
            if step % 3 == 2 {
                queue.dequeue();
            } else {
                queue.enqueue(format!("step {step}"));
            }
            assert!(queue.len() <= COMMAND_QUEUE_CAPACITY);
            assert_eq!(
                queue.state() == QueueState::Full,
                queue.len() == COMMAND_QUEUE_CAPACITY
            );
        }
    }

    #[test]
    fn test_wraparound_preserves_order() {
        let mut queue = CommandQueue::new();
        for i in 0..7 {
            queue.enqueue(format!("a{i}"));
        }
        for _ in 0..5 {
            queue.dequeue();
        }
        for i in 0..8 {
            assert!(queue.enqueue(format!("b{i}")));
        }
        let pending: Vec<&str> = queue.pending().collect();
        assert_eq!(pending.len(), 10);
        assert_eq!(pending[0], "a5");
        assert_eq!(pending[9], "b7");
    }
}
