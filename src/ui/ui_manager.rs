//! UI Manager: the single control loop of the interactive mode
//!
//! Each pass applies pending execution events, decodes any waiting key
//! presses into session or edit actions and redraws when something changed
//! or the tick interval elapsed.

use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crossterm::event::{self, Event};

use crate::config::Config;
use crate::session::{SessionManager, SubmitOutcome, TerminalHandoff};

use super::tui::{RenderSettings, Tui, UiAction, handle_key_event};

/// UI rendering state
#[derive(Debug, Clone)]
pub struct RenderState {
    pub should_quit: bool,
    pub should_redraw: bool,
    pub render_count: u64,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            should_quit: false,
            should_redraw: true,
            render_count: 0,
        }
    }
}

/// UI Manager for managing the terminal interface
pub struct UIManager {
    /// Sessions driven by this loop
    manager: SessionManager,
    /// UI rendering state
    render_state: RenderState,
    /// Presentation options
    settings: RenderSettings,
    /// TUI terminal handle
    tui: Option<Tui>,
    /// Desired refresh cadence
    refresh_interval: Duration,
    /// Time of the last successful render
    last_render: Instant,
}

impl UIManager {
    /// Create a new UIManager
    pub fn new(manager: SessionManager, config: &Config) -> Self {
        let refresh_interval = Duration::from_millis(config.tick_rate_ms.clamp(16, 1000));

        Self {
            manager,
            render_state: RenderState::default(),
            settings: RenderSettings::from_config(config),
            tui: None,
            refresh_interval,
            last_render: Instant::now(),
        }
    }

    /// Run the UI manager until the user quits
    pub async fn run(&mut self) -> Result<()> {
        info!("Starting UI manager");

        self.tui =
            Some(Tui::new().map_err(|e| anyhow::anyhow!("Failed to initialise terminal: {}", e))?);
        self.render_state.should_redraw = true;
        self.last_render = Instant::now()
            .checked_sub(self.refresh_interval)
            .unwrap_or_else(Instant::now);

        let result = self.run_ui_loop().await;

        self.manager.shutdown();
        if let Some(tui) = self.tui.as_mut() {
            tui.restore()
                .map_err(|e| anyhow::anyhow!("Failed to restore terminal state: {}", e))?;
        }

        info!(
            "UI manager stopped after {} frames",
            self.render_state.render_count
        );
        result
    }

    /// Main UI rendering loop
    async fn run_ui_loop(&mut self) -> Result<()> {
        while !self.render_state.should_quit {
            // Output and completions from running commands
            self.process_events();

            // Handle terminal input (non-blocking)
            self.poll_terminal_events()?;

            // Render on dirty state or cadence tick
            let now = Instant::now();
            if self.render_state.should_redraw
                || now.duration_since(self.last_render) >= self.refresh_interval
            {
                if let Some(tui) = self.tui.as_mut() {
                    self.render_state.render_count += 1;
                    tui.draw(&mut self.manager, &self.settings)
                        .map_err(|e| anyhow::anyhow!("Failed to render frame: {}", e))?;
                }
                self.render_state.should_redraw = false;
                self.last_render = now;
            }

            // Prevent busy loop
            tokio::time::sleep(Duration::from_millis(16)).await;
        }

        Ok(())
    }

    /// Apply every execution event already waiting
    fn process_events(&mut self) {
        let Some(tui) = self.tui.as_mut() else {
            return;
        };
        if self.manager.drain_exec_events(tui) > 0 {
            self.render_state.should_redraw = true;
        }
    }

    /// Poll for keyboard/terminal events and translate into session actions
    fn poll_terminal_events(&mut self) -> Result<()> {
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key_event) => {
                    let locked = self.manager.active().input.is_locked();
                    let action = handle_key_event(key_event, locked);
                    if action == UiAction::None {
                        continue;
                    }
                    self.render_state.should_redraw = true;

                    if let Some(tui) = self.tui.as_mut() {
                        if apply_action(&mut self.manager, action, tui) {
                            self.render_state.should_quit = true;
                            return Ok(());
                        }
                    }
                }
                Event::Resize(_, _) => {
                    self.render_state.should_redraw = true;
                }
                Event::Mouse(_) | Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
            }
        }

        Ok(())
    }
}

/// Apply a decoded action to the sessions. Returns `true` when the loop should quit.
pub fn apply_action(
    manager: &mut SessionManager,
    action: UiAction,
    term: &mut impl TerminalHandoff,
) -> bool {
    debug!("Applying {:?}", action);
    match action {
        UiAction::None => {}
        UiAction::QuitRequested => {
            info!("Quit requested from keyboard");
            return true;
        }
        UiAction::Submit => {
            if manager.submit_active_input(term) == SubmitOutcome::Quit {
                return true;
            }
        }
        UiAction::Edit(edit) => {
            manager.apply_edit(edit);
        }
        UiAction::NewSession => {
            manager.create_session();
        }
        UiAction::CloseSession => {
            manager.close_active();
        }
        UiAction::SwitchTo(id) => {
            manager.switch_to(id);
        }
        UiAction::NextSession => manager.next(),
        UiAction::PrevSession => manager.prev(),
        UiAction::SwitchToPartner => {
            manager.switch_to_split_partner();
        }
        UiAction::Split(orientation) => {
            manager.create_split(orientation);
        }
        UiAction::ScrollUp => manager.scroll_up(),
        UiAction::ScrollDown => manager.scroll_down(),
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Detached, EditAction, SplitOrientation};
    use std::path::PathBuf;

    fn manager() -> SessionManager {
        SessionManager::with_directory(&Config::default(), PathBuf::from("/tmp"))
    }

    #[tokio::test]
    async fn test_typed_exit_quits() {
        let mut manager = manager();
        for c in "exit".chars() {
            assert!(!apply_action(
                &mut manager,
                UiAction::Edit(EditAction::Insert(c)),
                &mut Detached
            ));
        }
        assert!(apply_action(&mut manager, UiAction::Submit, &mut Detached));
    }

    #[tokio::test]
    async fn test_session_actions() {
        let mut manager = manager();
        apply_action(&mut manager, UiAction::NewSession, &mut Detached);
        apply_action(&mut manager, UiAction::SwitchTo(1), &mut Detached);
        assert_eq!(manager.active_index(), 1);

        apply_action(
            &mut manager,
            UiAction::Split(SplitOrientation::Horizontal),
            &mut Detached,
        );
        assert_eq!(manager.active_index(), 2);

        apply_action(&mut manager, UiAction::SwitchToPartner, &mut Detached);
        assert_eq!(manager.active_index(), 1);

        apply_action(&mut manager, UiAction::CloseSession, &mut Detached);
        assert_eq!(manager.len(), 2);
        assert!(manager.sessions().iter().all(|s| s.split.is_none()));
    }

    #[tokio::test]
    async fn test_quit_request() {
        let mut manager = manager();
        assert!(apply_action(&mut manager, UiAction::QuitRequested, &mut Detached));
    }
}
