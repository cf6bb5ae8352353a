//! User Interface module
//!
//! Provides the TUI front end, the control loop driving it and plain CLI output.

/// TUI terminal handling, key decoding and rendering
pub mod tui;

/// Simple CLI output functions
pub mod cli;

/// Control loop tying input, execution events and rendering together
pub mod ui_manager;

pub use ui_manager::UIManager;
