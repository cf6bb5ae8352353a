//! Configuration management module
//!
//! Handles loading, validation, and management of application configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::session::command_router::DEFAULT_INTERACTIVE_COMMANDS;

/// Default configuration file looked up by the CLI
pub const DEFAULT_CONFIG_FILE: &str = "parrot.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of concurrent sessions
    pub max_sessions: usize,

    /// Shell used to run commands (`<shell> -c <command>`)
    pub shell: String,

    /// Keep embedded line breaks in scrollback entries
    pub preserve_line_breaks: bool,

    /// Control loop redraw interval in milliseconds
    pub tick_rate_ms: u64,

    /// Logging level
    pub log_level: String,

    /// Programs that take over the terminal instead of being captured
    pub interactive_commands: Vec<String>,

    /// Scrollback configuration
    pub history: HistoryConfig,

    /// Input line configuration
    pub input: InputConfig,

    /// UI-specific configuration
    pub ui: UiConfig,

    /// File-based logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Entry slots reserved for a new session before doubling kicks in
    pub initial_capacity: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    /// Maximum characters in the input line
    pub max_length: usize,

    /// Submitted commands remembered per session
    pub history_capacity: usize,
}

/// Clock style used in the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum TimeFormat {
    #[serde(rename = "24h")]
    TwentyFourHour,
    #[serde(rename = "12h")]
    TwelveHour,
}

impl TimeFormat {
    /// strftime pattern for the prompt clock
    pub fn prompt_pattern(&self) -> &'static str {
        match self {
            TimeFormat::TwentyFourHour => "[%H:%M:%S]:",
            TimeFormat::TwelveHour => "[%I:%M:%S %p]:",
        }
    }
}

impl std::str::FromStr for TimeFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "24h" => Ok(TimeFormat::TwentyFourHour),
            "12h" => Ok(TimeFormat::TwelveHour),
            other => anyhow::bail!("Invalid time format: {} (expected 24h or 12h)", other),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiConfig {
    /// Enable colors in TUI
    pub enable_colors: bool,

    /// Prompt clock style
    pub time_format: TimeFormat,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Absolute or relative path to the log file
    pub file_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_sessions: 8,
            shell: "/bin/sh".to_string(),
            preserve_line_breaks: true,
            tick_rate_ms: 100,
            log_level: "info".to_string(),
            interactive_commands: DEFAULT_INTERACTIVE_COMMANDS
                .iter()
                .map(|name| name.to_string())
                .collect(),
            history: HistoryConfig::default(),
            input: InputConfig::default(),
            ui: UiConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: crate::session::history_log::DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_length: crate::session::input_editor::DEFAULT_MAX_INPUT,
            history_capacity: crate::session::input_editor::DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            enable_colors: true,
            time_format: TimeFormat::TwentyFourHour,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file_path: "logs/parrot.log".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply `PARROT_*` overrides resolved through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // PARROT_MAX_SESSIONS - session limit
        if let Some(value) = lookup("PARROT_MAX_SESSIONS").and_then(|v| v.parse().ok()) {
            self.max_sessions = value;
        }

        // PARROT_SHELL - command shell
        if let Some(shell) = lookup("PARROT_SHELL") {
            if !shell.trim().is_empty() {
                self.shell = shell;
            }
        }

        // PARROT_PRESERVE_LINE_BREAKS - keep embedded newlines
        if let Some(value) = lookup("PARROT_PRESERVE_LINE_BREAKS") {
            self.preserve_line_breaks = value.parse().unwrap_or(self.preserve_line_breaks);
        }

        // PARROT_TICK_RATE_MS - redraw interval
        if let Some(value) = lookup("PARROT_TICK_RATE_MS").and_then(|v| v.parse().ok()) {
            self.tick_rate_ms = value;
        }

        // PARROT_LOG_LEVEL - logging level
        if let Some(log_level) = lookup("PARROT_LOG_LEVEL") {
            self.log_level = log_level;
        }

        // PARROT_LOG_FILE_PATH - logging destination file
        if let Some(file_path) = lookup("PARROT_LOG_FILE_PATH") {
            if !file_path.trim().is_empty() {
                self.log.file_path = file_path;
            }
        }

        // PARROT_INTERACTIVE_COMMANDS - comma-separated allow-list
        if let Some(commands) = lookup("PARROT_INTERACTIVE_COMMANDS") {
            self.interactive_commands = commands
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // PARROT_HISTORY_INITIAL_CAPACITY - scrollback preallocation
        if let Some(value) = lookup("PARROT_HISTORY_INITIAL_CAPACITY").and_then(|v| v.parse().ok())
        {
            self.history.initial_capacity = value;
        }

        // PARROT_INPUT_MAX_LENGTH - input line limit
        if let Some(value) = lookup("PARROT_INPUT_MAX_LENGTH").and_then(|v| v.parse().ok()) {
            self.input.max_length = value;
        }

        // PARROT_INPUT_HISTORY_CAPACITY - command history size
        if let Some(value) = lookup("PARROT_INPUT_HISTORY_CAPACITY").and_then(|v| v.parse().ok()) {
            self.input.history_capacity = value;
        }

        // PARROT_UI_ENABLE_COLORS - enable colors
        if let Some(enable_colors) = lookup("PARROT_UI_ENABLE_COLORS") {
            self.ui.enable_colors = enable_colors.parse().unwrap_or(self.ui.enable_colors);
        }

        // PARROT_UI_TIME_FORMAT - 24h or 12h clock
        if let Some(format) = lookup("PARROT_UI_TIME_FORMAT") {
            match format.parse() {
                Ok(value) => self.ui.time_format = value,
                Err(e) => tracing::warn!("Ignoring PARROT_UI_TIME_FORMAT: {}", e),
            }
        }
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        if !path.as_ref().exists() {
            let mut config = Self::default();
            config.apply_env_overrides();
            return match config.validate() {
                Ok(()) => config,
                Err(err) => {
                    tracing::warn!("Invalid environment overrides: {}, using defaults", err);
                    Self::default()
                }
            };
        }

        Self::load_from_file(path).unwrap_or_else(|err| {
            tracing::warn!("Failed to load config: {}, using defaults", err);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.max_sessions == 0 {
            anyhow::bail!("max_sessions must be greater than 0");
        }

        if self.shell.trim().is_empty() {
            anyhow::bail!("Shell must not be empty");
        }

        if self.tick_rate_ms == 0 {
            anyhow::bail!("Tick rate must be greater than 0");
        }

        if self.history.initial_capacity == 0 {
            anyhow::bail!("history.initial_capacity must be greater than 0");
        }

        if self.input.max_length == 0 {
            anyhow::bail!("input.max_length must be greater than 0");
        }

        if self.input.history_capacity == 0 {
            anyhow::bail!("input.history_capacity must be greater than 0");
        }

        if self.log.file_path.trim().is_empty() {
            anyhow::bail!("Log file path must not be empty");
        }

        for name in &self.interactive_commands {
            if name.trim().is_empty() {
                anyhow::bail!("Interactive command names must not be empty");
            }
        }

        Ok(())
    }
}
