//! Command Line Interface module
//!
//! Argument parsing for the `parrot` binary.

use clap::Parser;

use crate::config::DEFAULT_CONFIG_FILE;

#[derive(Parser, Debug, Clone)]
#[command(name = "parrot")]
#[command(about = "Parrot Terminal")]
#[command(long_about = "A terminal multiplexer hosting several shell sessions in one screen")]
#[command(version)]
pub struct Cli {
    /// Optional one-shot command (`manual` prints usage)
    pub command: Option<String>,

    /// Configuration file path
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// What the binary should do for the given arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchMode {
    Interactive,
    Manual,
    Unknown(String),
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn launch_mode(&self) -> LaunchMode {
        match self.command.as_deref() {
            None => LaunchMode::Interactive,
            Some("manual") => LaunchMode::Manual,
            Some(other) => LaunchMode::Unknown(other.to_string()),
        }
    }

    /// Adjust log level based on verbose flag, falling back to the config value
    pub fn effective_log_level(&self, configured: &str) -> String {
        if self.verbose {
            "debug".to_string()
        } else {
            self.log_level
                .clone()
                .unwrap_or_else(|| configured.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_modes() {
        let cli = Cli::parse_from(["parrot"]);
        assert_eq!(cli.launch_mode(), LaunchMode::Interactive);
        assert_eq!(cli.config_file, DEFAULT_CONFIG_FILE);

        let cli = Cli::parse_from(["parrot", "manual"]);
        assert_eq!(cli.launch_mode(), LaunchMode::Manual);

        let cli = Cli::parse_from(["parrot", "bogus"]);
        assert_eq!(cli.launch_mode(), LaunchMode::Unknown("bogus".to_string()));
    }

    #[test]
    fn test_effective_log_level() {
        let cli = Cli::parse_from(["parrot"]);
        assert_eq!(cli.effective_log_level("warn"), "warn");

        let cli = Cli::parse_from(["parrot", "--log-level", "trace"]);
        assert_eq!(cli.effective_log_level("warn"), "trace");

        let cli = Cli::parse_from(["parrot", "-v", "--log-level", "trace"]);
        assert_eq!(cli.effective_log_level("warn"), "debug");
    }
}
