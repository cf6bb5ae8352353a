//! Terminal User Interface implementation
//!
//! Provides the main TUI interface using ratatui.

mod input;
mod render;

use std::io::{self, Stdout, stdout};

use crossterm::{
    cursor, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::AppResult;
use crate::config::{Config, TimeFormat};
use crate::session::{EditAction, SessionManager, SplitOrientation, TerminalHandoff};

pub use input::handle_key_event;
use render::render_root;

/// Actions generated from key handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    None,
    Edit(EditAction),
    Submit,
    NewSession,
    CloseSession,
    SwitchTo(usize),
    NextSession,
    PrevSession,
    SwitchToPartner,
    Split(SplitOrientation),
    ScrollUp,
    ScrollDown,
    QuitRequested,
}

/// Presentation options taken from the config
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub time_format: TimeFormat,
    pub enable_colors: bool,
}

impl RenderSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            time_format: config.ui.time_format,
            enable_colors: config.ui.enable_colors,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::TwentyFourHour,
            enable_colors: true,
        }
    }
}

/// RAII helper controlling the terminal lifecycle
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    /// Create a new TUI terminal instance
    pub fn new() -> AppResult<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self { terminal })
    }

    /// Render the active session, its split partner and the tab strip
    pub fn draw(&mut self, manager: &mut SessionManager, settings: &RenderSettings) -> AppResult<()> {
        self.terminal.draw(|frame| {
            render_root(frame, manager, settings);
        })?;
        Ok(())
    }

    /// Restore terminal to canonical mode
    pub fn restore(&mut self) -> AppResult<()> {
        disable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, cursor::Show, LeaveAlternateScreen)?;
        Ok(())
    }
}

impl TerminalHandoff for Tui {
    fn suspend(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(stdout(), cursor::Show, LeaveAlternateScreen)
    }

    fn resume(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, cursor::Hide)?;
        self.terminal.clear()
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        // Attempt to restore the terminal; ignore errors because we are in Drop
        let _ = disable_raw_mode();
        let mut stdout = stdout();
        let _ = execute!(stdout, cursor::Show, LeaveAlternateScreen);
    }
}
