//! Command Router for submitted input lines

use tracing::debug;

/// Built-in that interrupts the running command
pub const STOP_COMMAND: &str = "stop";
/// Built-in that prints usage text
pub const MANUAL_COMMAND: &str = "manual";
/// Built-in that leaves the multiplexer
pub const EXIT_COMMAND: &str = "exit";

/// Programs that take over the whole terminal instead of being captured
pub const DEFAULT_INTERACTIVE_COMMANDS: &[&str] = &[
    "vim", "nvim", "nano", "ranger", "parrot", "htop", "top", "sudo", "ssh", "man", "less",
    "more",
];

/// Classification of a submitted line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutedCommand {
    Empty,
    Exit,
    Stop,
    Manual,
    /// `cd` with an optional target
    ChangeDirectory(Option<String>),
    /// Handed the real terminal, not captured
    Interactive(String),
    /// Spawned with output captured into the History Log
    Captured(String),
}

impl RoutedCommand {
    /// Whether this command is deferred to the queue while another one runs
    pub fn is_queueable(&self) -> bool {
        matches!(
            self,
            RoutedCommand::ChangeDirectory(_)
                | RoutedCommand::Interactive(_)
                | RoutedCommand::Captured(_)
        )
    }
}

/// Router classifying submitted lines
#[derive(Debug, Clone)]
pub struct CommandRouter {
    interactive_commands: Vec<String>,
}

impl CommandRouter {
    pub fn new(interactive_commands: Vec<String>) -> Self {
        Self {
            interactive_commands,
        }
    }

    /// Classify a submitted line. Matching is on the raw text: built-ins must
    /// match exactly and the interactive allow-list matches by prefix.
    pub fn route(&self, input: &str) -> RoutedCommand {
        let routed = match input {
            "" => RoutedCommand::Empty,
            EXIT_COMMAND => RoutedCommand::Exit,
            STOP_COMMAND => RoutedCommand::Stop,
            MANUAL_COMMAND => RoutedCommand::Manual,
            "cd" => RoutedCommand::ChangeDirectory(None),
            _ if input.starts_with("cd ") => {
                let target = input[3..].trim();
                RoutedCommand::ChangeDirectory((!target.is_empty()).then(|| target.to_string()))
            }
            _ if self.is_interactive(input) => RoutedCommand::Interactive(input.to_string()),
            _ => RoutedCommand::Captured(input.to_string()),
        };

        debug!("Routed {:?} as {:?}", input, routed);
        routed
    }

    pub fn is_interactive(&self, input: &str) -> bool {
        self.interactive_commands
            .iter()
            .any(|name| !name.is_empty() && input.starts_with(name.as_str()))
    }

    /// Banner shown at the top of every new session
    pub fn welcome_lines() -> Vec<String> {
        vec![
            format!(
                "Welcome to Parrot Terminal Version {}",
                env!("CARGO_PKG_VERSION")
            ),
            "==========================================".to_string(),
            "Type 'exit' to quit".to_string(),
            "Ctrl+T: New terminal, Ctrl+W: Close terminal".to_string(),
            "Alt+1-9: Switch terminals, Alt+=/-: Next/Prev terminal".to_string(),
            "Alt+Arrows: Switch between split panes".to_string(),
            "Arrows: Scroll terminal history".to_string(),
            "Shift+Up/Down: Command history".to_string(),
            String::new(),
        ]
    }

    /// In-session usage text appended by `manual`
    pub fn manual_lines() -> &'static [&'static str] {
        &[
            "Parrot Terminal Usage:",
            "======================",
            "Ctrl+T: Create new terminal",
            "Ctrl+W: Close current terminal",
            "Alt+1-9: Switch to terminal 1-9",
            "Alt+=/-: Switch to next/previous terminal",
            "Alt+H/Alt+V: Split horizontally/vertically",
            "Alt+Arrows: Switch between split panes",
            "Arrow Keys: Scroll terminal history",
            "Shift+Up/Down: Navigate command history",
            "Type 'stop' to interrupt running command",
            "Type 'exit' to quit",
            "Note: Commands queue automatically when another is running",
            "Queue size: 10 commands max",
        ]
    }
}

impl Default for CommandRouter {
    fn default() -> Self {
        Self::new(
            DEFAULT_INTERACTIVE_COMMANDS
                .iter()
                .map(|name| name.to_string())
                .collect(),
        )
    }
}
