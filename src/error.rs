//! Error taxonomy for the session engine
//!
//! Resource exhaustion is fatal and terminates the process with a distinct
//! exit code per resource. Everything else is recovered locally and surfaced
//! as a History Log entry by the caller.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::error;

/// Unrecoverable allocation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("Critical error: Failed to allocate memory for sessions")]
    SessionTable,
    #[error("Critical error: Failed to allocate history buffer")]
    HistoryInit,
    #[error("Critical error: Failed to reallocate history buffer")]
    HistoryGrowth,
}

impl ResourceError {
    /// Process exit code reserved for this resource
    pub fn exit_code(&self) -> i32 {
        match self {
            ResourceError::SessionTable => 1,
            ResourceError::HistoryInit => 2,
            ResourceError::HistoryGrowth => 3,
        }
    }

    /// Log the failure and terminate the process
    pub fn abort(self) -> ! {
        error!("{}", self);
        eprintln!("{}", self);
        std::process::exit(self.exit_code())
    }
}

/// OS-level failures raised while running a command
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Failed to create pipe: {0}")]
    Pipe(String),
    #[error("Failed to fork process: {0}")]
    Spawn(#[source] io::Error),
    #[error("Failed to launch interactive command: {0}")]
    Interactive(#[source] io::Error),
    #[error("cd: {}: {}", path.display(), source)]
    ChangeDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
