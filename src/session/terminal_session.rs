//! Session entity: one shell context with its own scrollback, input, queue and directory

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use super::command_queue::CommandQueue;
use super::history_log::HistoryLog;
use super::input_editor::InputEditor;

/// Stable identity of a session, unaffected by renumbering on close
pub type SessionKey = u64;

/// Identity of one captured command run
pub type RunId = u64;

/// Direction of a split between two sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitOrientation {
    Horizontal,
    Vertical,
}

/// Back-reference to the other half of a split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitLink {
    pub partner: usize,
    pub orientation: SplitOrientation,
}

/// Execution state of the foreground command
#[derive(Debug, Clone, Default)]
pub enum ExecState {
    #[default]
    Ready,
    Running {
        pid: Option<u32>,
        run: RunId,
        cancel: CancellationToken,
    },
}

/// Display status derived from the execution state and queue depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Ready,
    Running,
    Queued { depth: usize },
}

/// Per-session sizing, taken from the application config
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub history_capacity: usize,
    pub preserve_line_breaks: bool,
    pub max_input: usize,
    pub input_history: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            history_capacity: super::history_log::DEFAULT_HISTORY_CAPACITY,
            preserve_line_breaks: true,
            max_input: super::input_editor::DEFAULT_MAX_INPUT,
            input_history: super::input_editor::DEFAULT_HISTORY_CAPACITY,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    pub id: usize,
    key: SessionKey,
    directory: PathBuf,
    pub split: Option<SplitLink>,
    pub exec: ExecState,
    pub history: HistoryLog,
    pub input: InputEditor,
    pub queue: CommandQueue,
}

impl Session {
    pub fn new(id: usize, key: SessionKey, directory: PathBuf, limits: SessionLimits) -> Self {
        Self {
            id,
            key,
            directory,
            split: None,
            exec: ExecState::Ready,
            history: HistoryLog::with_capacity(
                limits.history_capacity,
                limits.preserve_line_breaks,
            ),
            input: InputEditor::with_limits(limits.max_input, limits.input_history),
            queue: CommandQueue::new(),
        }
    }

    pub fn key(&self) -> SessionKey {
        self.key
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn set_directory(&mut self, directory: PathBuf) {
        self.directory = directory;
    }

    pub fn is_running(&self) -> bool {
        matches!(self.exec, ExecState::Running { .. })
    }

    /// Process id of the running child, if any
    pub fn process_id(&self) -> Option<u32> {
        match &self.exec {
            ExecState::Running { pid, .. } => *pid,
            ExecState::Ready => None,
        }
    }

    /// Run id of the command currently owning the session
    pub fn current_run(&self) -> Option<RunId> {
        match &self.exec {
            ExecState::Running { run, .. } => Some(*run),
            ExecState::Ready => None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        if self.is_running() {
            SessionStatus::Running
        } else if !self.queue.is_empty() {
            SessionStatus::Queued {
                depth: self.queue.len(),
            }
        } else {
            SessionStatus::Ready
        }
    }

    /// Cancel the running command and return to Ready.
    ///
    /// Returns `false` when nothing was running.
    pub fn interrupt(&mut self) -> bool {
        match std::mem::take(&mut self.exec) {
            ExecState::Running { cancel, .. } => {
                cancel.cancel();
                true
            }
            ExecState::Ready => false,
        }
    }
}
