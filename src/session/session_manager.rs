//! Session Manager: ordered session collection, split graph and active selection

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ResourceError;

use super::action_channel::{ActionChannel, ExecEvent};
use super::command_router::CommandRouter;
use super::executor::{Executor, SubmitOutcome, TerminalHandoff};
use super::history_log::LineKind;
use super::input_editor::EditAction;
use super::terminal_session::{
    Session, SessionKey, SessionLimits, SplitLink, SplitOrientation,
};

/// How the active session is laid out on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Single,
    Split {
        partner: usize,
        orientation: SplitOrientation,
    },
}

/// Upper bound on execution events applied per call to `drain_exec_events`
pub const MAX_EVENTS_PER_TICK: usize = 512;

/// Counters reported when the manager shuts down
#[derive(Debug, Clone, Default)]
struct SessionStats {
    sessions_created: u64,
    commands_processed: u64,
    events_processed: u64,
}

/// Owner of every session and the execution engine driving them
pub struct SessionManager {
    sessions: Vec<Session>,
    active: usize,
    max_sessions: usize,
    limits: SessionLimits,
    next_key: SessionKey,
    executor: Executor,
    action_channel: ActionChannel,
    stats: SessionStats,
}

impl SessionManager {
    /// Create a manager whose first session starts in the process directory
    pub fn new(config: &Config) -> Result<Self> {
        let directory =
            std::env::current_dir().context("Failed to read the current working directory")?;
        Ok(Self::with_directory(config, directory))
    }

    /// Create a manager whose first session starts in `directory`
    pub fn with_directory(config: &Config, directory: PathBuf) -> Self {
        let action_channel = ActionChannel::new();
        let router = CommandRouter::new(config.interactive_commands.clone());
        let executor = Executor::new(config.shell.clone(), router, action_channel.clone());
        let max_sessions = config.max_sessions.max(1);

        let mut sessions = Vec::new();
        if sessions.try_reserve_exact(max_sessions).is_err() {
            ResourceError::SessionTable.abort();
        }

        let mut manager = Self {
            sessions,
            active: 0,
            max_sessions,
            limits: SessionLimits {
                history_capacity: config.history.initial_capacity,
                preserve_line_breaks: config.preserve_line_breaks,
                max_input: config.input.max_length,
                input_history: config.input.history_capacity,
            },
            next_key: 1,
            executor,
            action_channel,
            stats: SessionStats::default(),
        };

        manager.push_session(directory, None);
        info!(
            "Session manager ready (max {} sessions, shell {})",
            max_sessions, config.shell
        );
        manager
    }

    fn push_session(&mut self, directory: PathBuf, split: Option<SplitLink>) -> usize {
        let id = self.sessions.len();
        let key = self.next_key;
        self.next_key += 1;

        let mut session = Session::new(id, key, directory, self.limits);
        session.split = split;
        for line in CommandRouter::welcome_lines() {
            session.history.append(line, LineKind::Raw);
        }

        self.sessions.push(session);
        self.stats.sessions_created += 1;
        debug!("Created session {} (key {})", id, key);
        id
    }

    fn at_capacity(&self) -> bool {
        if self.sessions.len() >= self.max_sessions {
            debug!("Session limit {} reached", self.max_sessions);
            true
        } else {
            false
        }
    }

    /// Append a session inheriting the active directory. The active session is unchanged.
    pub fn create_session(&mut self) -> Option<usize> {
        if self.at_capacity() {
            return None;
        }
        let directory = self.active().directory().to_path_buf();
        Some(self.push_session(directory, None))
    }

    /// Create a session paired with the active one and switch to it
    pub fn create_split(&mut self, orientation: SplitOrientation) -> Option<usize> {
        if self.at_capacity() {
            return None;
        }

        let origin = self.active;
        // A session belongs to at most one split
        if let Some(old) = self.sessions[origin].split.take() {
            if let Some(partner) = self.sessions.get_mut(old.partner) {
                partner.split = None;
            }
        }

        let directory = self.sessions[origin].directory().to_path_buf();
        let id = self.push_session(
            directory,
            Some(SplitLink {
                partner: origin,
                orientation,
            }),
        );
        self.sessions[origin].split = Some(SplitLink {
            partner: id,
            orientation,
        });

        info!("Split session {} {:?} into {}", origin, orientation, id);
        self.switch_to(id);
        Some(id)
    }

    /// Make `id` the active session. Out-of-range ids are ignored.
    pub fn switch_to(&mut self, id: usize) -> bool {
        if id >= self.sessions.len() {
            return false;
        }
        if id != self.active {
            debug!("Switching session {} -> {}", self.active, id);
        }
        self.active = id;
        true
    }

    pub fn next(&mut self) {
        let next = (self.active + 1) % self.sessions.len();
        self.switch_to(next);
    }

    pub fn prev(&mut self) {
        let count = self.sessions.len();
        let prev = (self.active + count - 1) % count;
        self.switch_to(prev);
    }

    pub fn switch_to_split_partner(&mut self) -> bool {
        match self.active().split {
            Some(link) => self.switch_to(link.partner),
            None => false,
        }
    }

    /// Close the active session, keeping ids contiguous and partners symmetric
    pub fn close_active(&mut self) -> bool {
        if self.sessions.len() <= 1 {
            return false;
        }

        let closed = self.active;
        let session = &mut self.sessions[closed];
        if session.interrupt() {
            info!("Interrupted running command while closing session {}", closed);
        }
        if !session.queue.is_empty() {
            warn!(
                "Discarding {} queued commands from session {}",
                session.queue.len(),
                closed
            );
            debug!(
                "Discarded commands: {:?}",
                session.queue.pending().collect::<Vec<_>>()
            );
        }

        if let Some(link) = session.split.take() {
            if let Some(partner) = self.sessions.get_mut(link.partner) {
                partner.split = None;
            }
        }

        self.sessions.remove(closed);
        for (index, session) in self.sessions.iter_mut().enumerate() {
            session.id = index;
            if let Some(link) = session.split.as_mut() {
                if link.partner > closed {
                    link.partner -= 1;
                }
            }
        }

        if self.active >= self.sessions.len() {
            self.active = self.sessions.len() - 1;
        }

        info!(
            "Closed session {}, {} remaining",
            closed,
            self.sessions.len()
        );
        true
    }

    /// Run a line in the active session
    pub fn submit(&mut self, line: &str, term: &mut impl TerminalHandoff) -> SubmitOutcome {
        self.stats.commands_processed += 1;
        let session = &mut self.sessions[self.active];
        self.executor.submit(session, line, term)
    }

    /// Take the active input line and run it
    pub fn submit_active_input(&mut self, term: &mut impl TerminalHandoff) -> SubmitOutcome {
        match self.active_mut().input.submit() {
            Some(line) => self.submit(&line, term),
            None => SubmitOutcome::Continue,
        }
    }

    pub fn apply_edit(&mut self, action: EditAction) -> bool {
        self.active_mut().input.apply(action)
    }

    pub fn scroll_up(&mut self) {
        self.active_mut().history.scroll_up();
    }

    pub fn scroll_down(&mut self) {
        self.active_mut().history.scroll_down();
    }

    /// Route an execution event to the session that spawned it
    pub fn handle_exec_event(&mut self, event: ExecEvent, term: &mut impl TerminalHandoff) {
        self.stats.events_processed += 1;
        let key = event.session();
        match self.sessions.iter_mut().find(|s| s.key() == key) {
            Some(session) => self.executor.handle_event(session, event, term),
            None => debug!("Dropping event for closed session key {}", key),
        }
    }

    /// Apply events already waiting, at most `MAX_EVENTS_PER_TICK`.
    ///
    /// Returns how many were handled. A command producing output faster than
    /// it is applied leaves the rest for the next tick so input stays live.
    pub fn drain_exec_events(&mut self, term: &mut impl TerminalHandoff) -> usize {
        let mut handled = 0;
        while handled < MAX_EVENTS_PER_TICK {
            let Some(event) = self.action_channel.try_next_event() else {
                break;
            };
            self.handle_exec_event(event, term);
            handled += 1;
        }
        handled
    }

    /// Wait for the next execution event
    pub async fn next_exec_event(&mut self) -> Option<ExecEvent> {
        self.action_channel.next_event().await
    }

    /// Cancel every running command
    pub fn shutdown(&mut self) {
        let interrupted = self
            .sessions
            .iter_mut()
            .map(Session::interrupt)
            .filter(|stopped| *stopped)
            .count();
        info!(
            "Shutting down {} sessions ({} commands interrupted, {} created, {} submitted, {} events applied)",
            self.sessions.len(),
            interrupted,
            self.stats.sessions_created,
            self.stats.commands_processed,
            self.stats.events_processed
        );
    }

    pub fn layout_mode(&self) -> LayoutMode {
        match self.active().split {
            Some(link) => LayoutMode::Split {
                partner: link.partner,
                orientation: link.orientation,
            },
            None => LayoutMode::Single,
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn session(&self, id: usize) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn active(&self) -> &Session {
        &self.sessions[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Session {
        &mut self.sessions[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }
}
