mod history;
mod prompt;
mod tabs;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;

use crate::session::{LayoutMode, SessionManager, SplitOrientation};

use self::history::render_history;
use self::prompt::render_prompt;
use self::tabs::render_tabs;
use super::RenderSettings;

pub(super) fn render_root(
    frame: &mut Frame<'_>,
    manager: &mut SessionManager,
    settings: &RenderSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    render_tabs(frame, chunks[0], manager, settings);

    let active = manager.active_index();
    match manager.layout_mode() {
        LayoutMode::Single => render_history(frame, chunks[1], manager.active(), settings, None),
        LayoutMode::Split {
            partner,
            orientation,
        } => {
            // Vertical splits sit side by side, horizontal ones are stacked
            let direction = match orientation {
                SplitOrientation::Vertical => Direction::Horizontal,
                SplitOrientation::Horizontal => Direction::Vertical,
            };
            let panes = Layout::default()
                .direction(direction)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[1]);

            // Keep the lower-numbered session in the first pane
            let (first, second) = if active < partner {
                (active, partner)
            } else {
                (partner, active)
            };
            for (area, id) in [(panes[0], first), (panes[1], second)] {
                if let Some(session) = manager.session(id) {
                    render_history(frame, area, session, settings, Some(id == active));
                }
            }
        }
    }

    render_prompt(frame, chunks[2], manager.active_mut(), settings);
}

/// Drop colors and modifiers when the config disables them
fn paint(style: Style, settings: &RenderSettings) -> Style {
    if settings.enable_colors {
        style
    } else {
        Style::default()
    }
}
