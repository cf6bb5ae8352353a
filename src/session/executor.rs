//! Execution engine: routes submitted lines, spawns captured commands as
//! cancellable tasks, hands the terminal to interactive programs and drains
//! the per-session command queue.

use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::LazyLock;

use chrono::Local;
use regex::Regex;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::ExecError;
use crate::paths::resolve_directory;

use super::action_channel::{ActionChannel, ExecEvent, ExitOutcome};
use super::command_queue::{COMMAND_QUEUE_CAPACITY, QueueState};
use super::command_router::{CommandRouter, RoutedCommand};
use super::history_log::LineKind;
use super::terminal_session::{ExecState, RunId, Session, SessionKey};

/// Longest captured line; longer output is split into several entries
pub const MAX_LINE_BYTES: usize = 4096;

/// CSI sequences (colors, cursor movement, erase) and OSC titles
static ANSI_ESCAPE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[@-Z\\-_]").ok()
});

/// Remove colorization and other escape sequences from a captured line
pub fn strip_ansi(line: &str) -> String {
    match ANSI_ESCAPE.as_ref() {
        Some(pattern) if line.contains('\x1b') => pattern.replace_all(line, "").into_owned(),
        _ => line.to_string(),
    }
}

/// Gives an interactive program exclusive use of the real terminal
pub trait TerminalHandoff {
    /// Leave the alternate screen and raw mode
    fn suspend(&mut self) -> io::Result<()>;
    /// Re-enter the display after the program exits
    fn resume(&mut self) -> io::Result<()>;
}

/// Handoff used when no display owns the terminal (tests, headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct Detached;

impl TerminalHandoff for Detached {
    fn suspend(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn resume(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Result of submitting a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Continue,
    Quit,
}

/// Command execution engine shared by all sessions
pub struct Executor {
    shell: String,
    router: CommandRouter,
    channel: ActionChannel,
    next_run: RunId,
}

impl Executor {
    pub fn new(shell: impl Into<String>, router: CommandRouter, channel: ActionChannel) -> Self {
        Self {
            shell: shell.into(),
            router,
            channel,
            next_run: 1,
        }
    }

    /// Handle a line submitted by the user
    pub fn submit(
        &mut self,
        session: &mut Session,
        line: &str,
        term: &mut impl TerminalHandoff,
    ) -> SubmitOutcome {
        let routed = self.router.route(line);
        match routed {
            RoutedCommand::Empty => {}
            RoutedCommand::Exit => {
                info!("Exit requested from session {}", session.id);
                return SubmitOutcome::Quit;
            }
            RoutedCommand::Stop => self.stop(session, term),
            RoutedCommand::Manual => {
                for line in CommandRouter::manual_lines() {
                    session.history.append(*line, LineKind::Raw);
                }
            }
            routed if session.is_running() && routed.is_queueable() => {
                Self::defer(session, line)
            }
            routed => self.dispatch(session, line, routed, term),
        }
        SubmitOutcome::Continue
    }

    fn defer(session: &mut Session, line: &str) {
        if session.queue.enqueue(line) {
            session.history.append(
                format!(
                    "Command added to queue. Queue size: {}/{}",
                    session.queue.len(),
                    COMMAND_QUEUE_CAPACITY
                ),
                LineKind::Output,
            );
        } else {
            session.history.append(
                format!(
                    "Command queue is full! Maximum {} commands allowed.",
                    COMMAND_QUEUE_CAPACITY
                ),
                LineKind::Raw,
            );
            session.input.lock();
        }
    }

    /// Interrupt the running command, if any, then start whatever is queued
    pub fn stop(&mut self, session: &mut Session, term: &mut impl TerminalHandoff) {
        let pid = session.process_id();
        if session.interrupt() {
            info!("Interrupted command in session {} (pid {:?})", session.id, pid);
            session
                .history
                .append("Command interrupted", LineKind::Output);
            self.drain_queue(session, term);
        } else {
            session
                .history
                .append("No command is currently running", LineKind::Output);
        }
    }

    /// Run a line on a Ready session
    fn dispatch(
        &mut self,
        session: &mut Session,
        line: &str,
        routed: RoutedCommand,
        term: &mut impl TerminalHandoff,
    ) {
        session.input.remember(line);

        match routed {
            RoutedCommand::ChangeDirectory(target) => Self::change_directory(session, target),
            RoutedCommand::Interactive(command) => {
                Self::echo(session, &command);
                self.run_interactive(session, &command, term);
            }
            RoutedCommand::Captured(command) => {
                Self::echo(session, &command);
                if let Err(e) = self.spawn_captured(session, &command) {
                    error!("Failed to start {:?}: {}", command, e);
                    session.history.append(e.to_string(), LineKind::Output);
                }
            }
            other => debug!("Ignoring {:?} on dispatch", other),
        }
    }

    fn echo(session: &mut Session, command: &str) {
        let stamp = Local::now().format("[%H:%M:%S]");
        session
            .history
            .append(format!("{} {}", stamp, command), LineKind::Command);
    }

    fn change_directory(session: &mut Session, target: Option<String>) {
        match resolve_directory(session.directory(), target.as_deref()) {
            Ok(directory) => {
                debug!("Session {} now in {}", session.id, directory.display());
                session.set_directory(directory);
            }
            Err(e) => {
                warn!("{}", e);
                session.history.append(e.to_string(), LineKind::Output);
            }
        }
    }

    fn run_interactive(
        &mut self,
        session: &mut Session,
        command: &str,
        term: &mut impl TerminalHandoff,
    ) {
        session
            .history
            .append("Starting interactive application...", LineKind::Output);
        info!("Handing terminal to {:?}", command);

        if let Err(e) = term.suspend() {
            let e = ExecError::Interactive(e);
            error!("{}", e);
            session.history.append(e.to_string(), LineKind::Output);
            return;
        }

        let status = std::process::Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .current_dir(session.directory())
            .status();

        if let Err(e) = term.resume() {
            error!("Failed to restore display: {}", e);
        }

        match status {
            Ok(status) => {
                if let Some(code) = interactive_exit_code(&status) {
                    session.history.append(
                        format!("Command returned with exit code: {}", code),
                        LineKind::Output,
                    );
                }
            }
            Err(e) => {
                let e = ExecError::Interactive(e);
                error!("{}", e);
                session.history.append(e.to_string(), LineKind::Output);
            }
        }

        session
            .history
            .append("Returned to Parrot Terminal", LineKind::Output);
    }

    fn spawn_captured(&mut self, session: &mut Session, command: &str) -> Result<(), ExecError> {
        let mut child = build_command(&self.shell, command, session.directory())
            .spawn()
            .map_err(ExecError::Spawn)?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            if let Err(e) = child.start_kill() {
                warn!("Failed to kill child without pipes: {}", e);
            }
            return Err(ExecError::Pipe("output stream was not captured".to_string()));
        };

        let pid = child.id();
        let run = self.next_run;
        self.next_run += 1;
        let cancel = CancellationToken::new();

        info!(
            "Session {} running {:?} (pid {:?}, run {})",
            session.id, command, pid, run
        );

        tokio::spawn(supervise(
            child,
            stdout,
            stderr,
            session.key(),
            run,
            cancel.clone(),
            self.channel.clone(),
        ));

        session.exec = ExecState::Running { pid, run, cancel };
        Ok(())
    }

    /// Apply an event from a command task to its session.
    ///
    /// Events from a run that no longer owns the session are dropped.
    pub fn handle_event(
        &mut self,
        session: &mut Session,
        event: ExecEvent,
        term: &mut impl TerminalHandoff,
    ) {
        if session.current_run() != Some(event.run()) {
            debug!(
                "Dropping stale event for run {} in session {}",
                event.run(),
                session.id
            );
            return;
        }

        match event {
            ExecEvent::Output { line, .. } => session.history.append(line, LineKind::Output),
            ExecEvent::Finished { outcome, run, .. } => {
                debug!("Run {} finished: {:?}", run, outcome);
                if let Some(message) = outcome.message() {
                    session.history.append(message, LineKind::Output);
                }
                session.exec = ExecState::Ready;
                self.drain_queue(session, term);
            }
        }
    }

    /// Start queued commands until one keeps the session busy
    fn drain_queue(&mut self, session: &mut Session, term: &mut impl TerminalHandoff) {
        while !session.is_running() {
            let Some(command) = session.queue.dequeue() else {
                break;
            };
            if session.queue.state() == QueueState::Normal {
                session.input.unlock();
            }
            debug!("Dequeued {:?} in session {}", command, session.id);

            let routed = self.router.route(&command);
            self.dispatch(session, &command, routed, term);
        }
    }
}

fn build_command(shell: &str, command: &str, directory: &Path) -> Command {
    let mut cmd = Command::new(shell);
    cmd.arg("-c")
        .arg(command)
        .current_dir(directory)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Owns one captured child until it has been reaped or cancelled
async fn supervise(
    mut child: Child,
    stdout: impl AsyncRead + Unpin,
    stderr: impl AsyncRead + Unpin,
    session: SessionKey,
    run: RunId,
    cancel: CancellationToken,
    channel: ActionChannel,
) {
    let finished = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        status = async {
            tokio::join!(
                pump_lines(stdout, session, run, &channel),
                pump_lines(stderr, session, run, &channel),
            );
            child.wait().await
        } => Some(status),
    };

    let outcome = match finished {
        None => {
            if let Err(e) = child.kill().await {
                warn!("Failed to kill cancelled run {}: {}", run, e);
            }
            ExitOutcome::Cancelled
        }
        Some(Ok(status)) => exit_outcome(&status),
        Some(Err(e)) => ExitOutcome::WaitFailed(e.to_string()),
    };

    if let Err(e) = channel
        .send_event(ExecEvent::Finished {
            session,
            run,
            outcome,
        })
        .await
    {
        debug!("Run {} completed after shutdown: {}", run, e);
    }
}

async fn pump_lines(
    reader: impl AsyncRead + Unpin,
    session: SessionKey,
    run: RunId,
    channel: &ActionChannel,
) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let mut limited = (&mut reader).take(MAX_LINE_BYTES as u64);
        match limited.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                }
                let line = strip_ansi(&String::from_utf8_lossy(&buf));
                if channel
                    .send_event(ExecEvent::Output { session, run, line })
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Err(e) => {
                warn!("Read error on run {}: {}", run, e);
                break;
            }
        }
    }
}

/// Map a reaped child's status to an outcome
pub fn exit_outcome(status: &ExitStatus) -> ExitOutcome {
    if let Some(code) = status.code() {
        return if code == 0 {
            ExitOutcome::Success
        } else {
            ExitOutcome::Code(code)
        };
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return ExitOutcome::Signal(signal);
        }
    }

    ExitOutcome::Success
}

/// Non-zero code reported for an interactive run, signals folded to 128+n
fn interactive_exit_code(status: &ExitStatus) -> Option<i32> {
    match exit_outcome(status) {
        ExitOutcome::Code(code) => Some(code),
        ExitOutcome::Signal(signal) => Some(128 + signal),
        _ => None,
    }
}
