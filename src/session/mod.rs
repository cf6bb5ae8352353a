//! Session engine
//!
//! Sessions, their scrollback, input editing and command queues, plus the
//! execution engine that runs submitted commands and the manager that owns
//! the whole collection.

pub mod action_channel;
pub mod command_queue;
pub mod command_router;
pub mod executor;
pub mod history_log;
pub mod input_editor;
pub mod session_manager;
pub mod terminal_session;

pub use action_channel::{ActionChannel, ExecEvent, ExitOutcome};
pub use command_queue::{COMMAND_QUEUE_CAPACITY, CommandQueue, QueueState};
pub use command_router::{CommandRouter, RoutedCommand};
pub use executor::{Detached, Executor, SubmitOutcome, TerminalHandoff};
pub use history_log::{HistoryEntry, HistoryLog, LineKind};
pub use input_editor::{EditAction, InputEditor};
pub use session_manager::{LayoutMode, MAX_EVENTS_PER_TICK, SessionManager};
pub use terminal_session::{
    ExecState, RunId, Session, SessionKey, SessionStatus, SplitLink, SplitOrientation,
};
