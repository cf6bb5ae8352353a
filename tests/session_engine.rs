//! End-to-end tests for command execution inside sessions
//!
//! These drive a real `/bin/sh` through the session manager with a detached
//! terminal, pumping execution events the way the UI loop does.

use std::path::PathBuf;
use std::time::Duration;

use parrot::config::Config;
use parrot::session::{
    COMMAND_QUEUE_CAPACITY, Detached, LineKind, MAX_EVENTS_PER_TICK, SessionManager,
    SessionStatus, SplitOrientation, SubmitOutcome,
};
use tempfile::TempDir;

fn manager_in(directory: PathBuf) -> SessionManager {
    SessionManager::with_directory(&Config::default(), directory)
}

/// Apply events until the active session has nothing running or queued
async fn settle(manager: &mut SessionManager) {
    while manager.active().status() != SessionStatus::Ready {
        let event = tokio::time::timeout(Duration::from_secs(10), manager.next_exec_event())
            .await
            .expect("command did not finish in time")
            .expect("event channel closed");
        manager.handle_exec_event(event, &mut Detached);
    }
    manager.drain_exec_events(&mut Detached);
}

/// History lines appended after the first `skip` entries
fn lines_after(manager: &SessionManager, skip: usize) -> Vec<(String, LineKind)> {
    manager
        .active()
        .history
        .iter()
        .skip(skip)
        .map(|entry| (entry.text.clone(), entry.kind))
        .collect()
}

#[tokio::test]
async fn test_echo_output_is_captured() {
    let mut manager = manager_in(PathBuf::from("/tmp"));
    let before = manager.active().history.len();

    manager.submit("echo hello", &mut Detached);
    assert_eq!(manager.active().status(), SessionStatus::Running);

    settle(&mut manager).await;
    assert_eq!(manager.active().status(), SessionStatus::Ready);

    let lines = lines_after(&manager, before);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].1, LineKind::Command);
    assert!(lines[0].0.ends_with("] echo hello"));
    assert_eq!(lines[1], ("hello".to_string(), LineKind::Output));
}

#[tokio::test]
async fn test_queue_overflow_locks_input() {
    let mut manager = manager_in(PathBuf::from("/tmp"));

    manager.submit("sleep 5", &mut Detached);
    for i in 0..COMMAND_QUEUE_CAPACITY {
        manager.submit(&format!("echo queued {}", i), &mut Detached);
    }
    assert_eq!(
        manager.active().status(),
        SessionStatus::Running,
        "running takes precedence over queued"
    );
    assert_eq!(manager.active().queue.len(), COMMAND_QUEUE_CAPACITY);
    assert!(!manager.active().input.is_locked());

    manager.submit("echo overflow", &mut Detached);
    assert_eq!(manager.active().queue.len(), COMMAND_QUEUE_CAPACITY);
    assert!(manager.active().input.is_locked());
    let last = manager.active().history.last().unwrap();
    assert_eq!(
        last.text,
        "Command queue is full! Maximum 10 commands allowed."
    );

    // Stopping frees the first slot and runs the queue head
    manager.submit("stop", &mut Detached);
    assert!(!manager.active().input.is_locked());
    assert_eq!(manager.active().queue.len(), COMMAND_QUEUE_CAPACITY - 1);

    settle(&mut manager).await;
    let texts: Vec<String> = manager
        .active()
        .history
        .iter()
        .map(|e| e.text.clone())
        .collect();
    assert!(texts.contains(&"Command interrupted".to_string()));
    assert!(texts.contains(&"queued 0".to_string()));
    assert!(texts.contains(&"queued 9".to_string()));
    assert!(!texts.iter().any(|t| t == "overflow"));
}

#[tokio::test]
async fn test_stop_without_running_command() {
    let mut manager = manager_in(PathBuf::from("/tmp"));
    let before = manager.active().history.len();

    manager.submit("stop", &mut Detached);

    let lines = lines_after(&manager, before);
    assert_eq!(
        lines,
        vec![(
            "No command is currently running".to_string(),
            LineKind::Output
        )]
    );
    assert_eq!(manager.active().status(), SessionStatus::Ready);
}

#[tokio::test]
async fn test_stop_discards_late_output() {
    let mut manager = manager_in(PathBuf::from("/tmp"));

    manager.submit("sleep 1; echo late", &mut Detached);
    manager.submit("stop", &mut Detached);
    assert_eq!(manager.active().status(), SessionStatus::Ready);

    // Give the cancelled task time to report, then apply whatever arrived
    tokio::time::sleep(Duration::from_millis(1500)).await;
    manager.drain_exec_events(&mut Detached);

    let texts: Vec<String> = manager
        .active()
        .history
        .iter()
        .map(|e| e.text.clone())
        .collect();
    assert!(!texts.contains(&"late".to_string()));
    assert_eq!(texts.last().unwrap(), "Command interrupted");
}

#[tokio::test]
async fn test_cd_failure_keeps_directory() {
    let mut manager = manager_in(PathBuf::from("/tmp"));
    let before = manager.active().history.len();

    manager.submit("cd /nonexistent_parrot_dir", &mut Detached);

    let lines = lines_after(&manager, before);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].0.starts_with("cd: /nonexistent_parrot_dir"));
    assert_eq!(manager.active().directory(), PathBuf::from("/tmp"));
}

#[tokio::test]
async fn test_cd_changes_session_directory_only() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().canonicalize().unwrap();
    let mut manager = manager_in(PathBuf::from("/tmp"));
    manager.create_session();

    manager.submit(&format!("cd {}", target.display()), &mut Detached);
    assert_eq!(manager.active().directory(), target.as_path());

    manager.submit("pwd", &mut Detached);
    settle(&mut manager).await;
    let last = manager.active().history.last().unwrap();
    assert_eq!(last.text, target.display().to_string());

    // Other sessions and the process itself are unaffected
    assert_eq!(
        manager.session(1).unwrap().directory(),
        PathBuf::from("/tmp")
    );
    assert_ne!(std::env::current_dir().unwrap(), target);
}

#[tokio::test]
async fn test_exit_status_reported() {
    let mut manager = manager_in(PathBuf::from("/tmp"));

    manager.submit("exit 3", &mut Detached);
    settle(&mut manager).await;

    let last = manager.active().history.last().unwrap();
    assert_eq!(last.text, "Command exited with status: 3");
}

#[tokio::test]
async fn test_signal_termination_reported() {
    let mut manager = manager_in(PathBuf::from("/tmp"));

    manager.submit("kill -9 $$", &mut Detached);
    settle(&mut manager).await;

    let last = manager.active().history.last().unwrap();
    assert_eq!(last.text, "Command terminated by signal: 9");
}

#[tokio::test]
async fn test_stderr_and_ansi_are_cleaned() {
    let mut manager = manager_in(PathBuf::from("/tmp"));
    let before = manager.active().history.len();

    manager.submit(r"printf '\033[31mred\033[0m\n'; echo oops >&2", &mut Detached);
    settle(&mut manager).await;

    let texts: Vec<String> = lines_after(&manager, before)
        .into_iter()
        .map(|(text, _)| text)
        .collect();
    assert!(texts.contains(&"red".to_string()));
    assert!(texts.contains(&"oops".to_string()));
}

#[tokio::test]
async fn test_output_lands_in_originating_session() {
    let mut manager = manager_in(PathBuf::from("/tmp"));
    manager.create_session();

    manager.submit("sleep 0.2; echo first", &mut Detached);
    manager.switch_to(1);
    manager.switch_to(0);
    settle(&mut manager).await;
    manager.switch_to(1);

    let in_second = manager
        .active()
        .history
        .iter()
        .any(|entry| entry.text == "first");
    assert!(!in_second);
    assert!(
        manager
            .session(0)
            .unwrap()
            .history
            .iter()
            .any(|entry| entry.text == "first")
    );
}

#[tokio::test]
async fn test_close_renumbers_and_clears_split() {
    let mut manager = manager_in(PathBuf::from("/tmp"));
    manager.create_session();
    manager.switch_to(1);
    manager.create_split(SplitOrientation::Vertical);
    assert_eq!(manager.len(), 3);
    assert_eq!(manager.active_index(), 2);

    // Close the split's origin; its partner slides down to id 1
    manager.switch_to(1);
    assert!(manager.close_active());
    assert_eq!(manager.len(), 2);
    for (index, session) in manager.sessions().iter().enumerate() {
        assert_eq!(session.id, index);
        assert!(session.split.is_none());
    }
    assert_eq!(manager.active_index(), 1);
}

#[tokio::test]
async fn test_exit_builtin_requests_quit() {
    let mut manager = manager_in(PathBuf::from("/tmp"));
    assert_eq!(manager.submit("exit", &mut Detached), SubmitOutcome::Quit);
    assert_eq!(
        manager.submit("echo still here", &mut Detached),
        SubmitOutcome::Continue
    );
    settle(&mut manager).await;
}

#[tokio::test]
async fn test_flooding_command_leaves_loop_responsive() {
    let mut manager = manager_in(PathBuf::from("/tmp"));

    manager.submit("yes", &mut Detached);
    tokio::time::sleep(Duration::from_millis(200)).await;

    let handled = manager.drain_exec_events(&mut Detached);
    assert_eq!(handled, MAX_EVENTS_PER_TICK);
    assert!(manager.active().is_running());

    manager.submit("stop", &mut Detached);
    assert_eq!(manager.active().status(), SessionStatus::Ready);
    let after_stop = manager.active().history.len();

    // Buffered output of the cancelled run is dropped, not appended
    for _ in 0..5 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        manager.drain_exec_events(&mut Detached);
    }
    assert_eq!(manager.active().history.len(), after_stop);
    assert_eq!(
        manager.active().history.last().unwrap().text,
        "Command interrupted"
    );
}

#[tokio::test]
async fn test_interactive_command_is_not_captured() {
    let config = Config {
        interactive_commands: vec!["false".to_string()],
        ..Config::default()
    };
    let mut manager = SessionManager::with_directory(&config, PathBuf::from("/tmp"));
    let before = manager.active().history.len();

    manager.submit("false", &mut Detached);
    assert_eq!(manager.active().status(), SessionStatus::Ready);

    let lines = lines_after(&manager, before);
    let texts: Vec<&str> = lines.iter().map(|(text, _)| text.as_str()).collect();
    assert_eq!(lines[0].1, LineKind::Command);
    assert!(texts[0].ends_with("] false"));
    assert_eq!(
        texts[1..].to_vec(),
        vec![
            "Starting interactive application...",
            "Command returned with exit code: 1",
            "Returned to Parrot Terminal",
        ]
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(manager.drain_exec_events(&mut Detached), 0);
}

#[tokio::test]
async fn test_trailing_partial_line_is_flushed() {
    let mut manager = manager_in(PathBuf::from("/tmp"));
    let before = manager.active().history.len();

    manager.submit(r"printf 'a\nb'", &mut Detached);
    settle(&mut manager).await;

    let texts: Vec<String> = lines_after(&manager, before)
        .into_iter()
        .skip(1)
        .map(|(text, _)| text)
        .collect();
    assert_eq!(texts, vec!["a", "b"]);
}

#[tokio::test]
async fn test_completion_unlocks_full_queue() {
    let mut manager = manager_in(PathBuf::from("/tmp"));

    manager.submit("sleep 0.3", &mut Detached);
    for _ in 0..COMMAND_QUEUE_CAPACITY {
        manager.submit("sleep 0.1", &mut Detached);
    }
    manager.submit("echo overflow", &mut Detached);
    assert!(manager.active().input.is_locked());

    // The first completion dequeues one entry, leaving the queue Normal
    while manager.active().input.is_locked() {
        let event = tokio::time::timeout(Duration::from_secs(10), manager.next_exec_event())
            .await
            .expect("command did not finish in time")
            .expect("event channel closed");
        manager.handle_exec_event(event, &mut Detached);
    }
    assert_eq!(manager.active().queue.len(), COMMAND_QUEUE_CAPACITY - 1);
    assert!(manager.active().is_running());
    assert!(
        !manager
            .active()
            .history
            .iter()
            .any(|entry| entry.text == "Command interrupted")
    );

    settle(&mut manager).await;
}

#[tokio::test]
async fn test_queued_cd_applies_before_next_entry() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().canonicalize().unwrap();
    let mut manager = manager_in(PathBuf::from("/tmp"));

    manager.submit("sleep 0.2", &mut Detached);
    manager.submit(&format!("cd {}", target.display()), &mut Detached);
    manager.submit("pwd", &mut Detached);
    assert_eq!(manager.active().queue.len(), 2);

    settle(&mut manager).await;

    assert_eq!(manager.active().directory(), target.as_path());
    assert!(manager.active().queue.is_empty());
    let last = manager.active().history.last().unwrap();
    assert_eq!(last.text, target.display().to_string());
}

#[tokio::test]
async fn test_builtins_bypass_queue_while_running() {
    let mut manager = manager_in(PathBuf::from("/tmp"));

    manager.submit("sleep 5", &mut Detached);
    manager.submit("manual", &mut Detached);
    assert!(manager.active().queue.is_empty());
    assert_eq!(manager.active().history.last().unwrap().kind, LineKind::Raw);

    manager.submit("stop", &mut Detached);
    assert!(manager.active().queue.is_empty());
    assert_eq!(manager.active().status(), SessionStatus::Ready);
}
