//! Action Channel carrying execution events from command tasks to the control loop

use anyhow::Result;
use tokio::sync::mpsc;

use super::terminal_session::{RunId, SessionKey};

/// Events buffered before command tasks wait for the control loop
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// How a captured command ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    /// Normal exit with a non-zero code
    Code(i32),
    /// Terminated by the given signal number
    Signal(i32),
    /// Killed after its cancellation token fired
    Cancelled,
    /// Waiting on the child failed
    WaitFailed(String),
}

impl ExitOutcome {
    /// History Log line describing the outcome, if one is warranted
    pub fn message(&self) -> Option<String> {
        match self {
            ExitOutcome::Success | ExitOutcome::Cancelled => None,
            ExitOutcome::Code(code) => Some(format!("Command exited with status: {}", code)),
            ExitOutcome::Signal(signal) => {
                Some(format!("Command terminated by signal: {}", signal))
            }
            ExitOutcome::WaitFailed(err) => Some(format!("Failed to wait for process: {}", err)),
        }
    }
}

/// Events emitted by a running command task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecEvent {
    /// One captured line, ANSI sequences already stripped
    Output {
        session: SessionKey,
        run: RunId,
        line: String,
    },
    /// The child has been reaped
    Finished {
        session: SessionKey,
        run: RunId,
        outcome: ExitOutcome,
    },
}

impl ExecEvent {
    pub fn session(&self) -> SessionKey {
        match self {
            ExecEvent::Output { session, .. } | ExecEvent::Finished { session, .. } => *session,
        }
    }

    pub fn run(&self) -> RunId {
        match self {
            ExecEvent::Output { run, .. } | ExecEvent::Finished { run, .. } => *run,
        }
    }
}

/// Action channel for event processing
pub struct ActionChannel {
    /// Event sender
    event_tx: mpsc::Sender<ExecEvent>,
    /// Event receiver
    event_rx: Option<mpsc::Receiver<ExecEvent>>,
}

impl Clone for ActionChannel {
    fn clone(&self) -> Self {
        Self {
            event_tx: self.event_tx.clone(),
            event_rx: None, // Receivers cannot be cloned
        }
    }
}

impl ActionChannel {
    /// Create a new ActionChannel
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            event_tx,
            event_rx: Some(event_rx),
        }
    }

    /// Send event to channel, waiting while it is full
    pub async fn send_event(&self, event: ExecEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send event: {}", e))
    }

    /// Wait for the next event
    pub async fn next_event(&mut self) -> Option<ExecEvent> {
        if let Some(event_rx) = &mut self.event_rx {
            event_rx.recv().await
        } else {
            None
        }
    }

    /// Take an already queued event without waiting
    pub fn try_next_event(&mut self) -> Option<ExecEvent> {
        self.event_rx.as_mut()?.try_recv().ok()
    }
}

impl Default for ActionChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clone_shares_sender_only() {
        let mut channel = ActionChannel::new();
        let mut sender = channel.clone();

        sender
            .send_event(ExecEvent::Output {
                session: 3,
                run: 9,
                line: "hello".to_string(),
            })
            .await
            .unwrap();

        let event = channel.next_event().await.unwrap();
        assert_eq!(event.session(), 3);
        assert_eq!(event.run(), 9);
        assert!(sender.try_next_event().is_none());
        assert!(channel.try_next_event().is_none());
    }

    #[tokio::test]
    async fn test_full_channel_applies_backpressure() {
        let mut channel = ActionChannel::new();
        let sender = channel.clone();

        for run in 0..EVENT_CHANNEL_CAPACITY as u64 {
            sender
                .send_event(ExecEvent::Finished {
                    session: 1,
                    run,
                    outcome: ExitOutcome::Success,
                })
                .await
                .unwrap();
        }

        let overflow = ExecEvent::Finished {
            session: 1,
            run: u64::MAX,
            outcome: ExitOutcome::Success,
        };
        let blocked = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            sender.send_event(overflow.clone()),
        )
        .await;
        assert!(blocked.is_err(), "send should wait while the channel is full");

        assert_eq!(channel.try_next_event().map(|e| e.run()), Some(0));
        sender.send_event(overflow).await.unwrap();
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(ExitOutcome::Success.message(), None);
        assert_eq!(ExitOutcome::Cancelled.message(), None);
        assert_eq!(
            ExitOutcome::Code(2).message().as_deref(),
            Some("Command exited with status: 2")
        );
        assert_eq!(
            ExitOutcome::Signal(9).message().as_deref(),
            Some("Command terminated by signal: 9")
        );
    }
}
