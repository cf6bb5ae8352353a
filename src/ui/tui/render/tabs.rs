use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::paths::shorten_path;
use crate::session::{SessionManager, SessionStatus};
use crate::ui::tui::RenderSettings;

use super::paint;

const MIN_TAB_WIDTH: usize = 15;

pub(super) fn render_tabs(
    frame: &mut Frame<'_>,
    area: Rect,
    manager: &SessionManager,
    settings: &RenderSettings,
) {
    let total_width = area.width as usize;
    let count = manager.len().max(1);
    let tab_width = (total_width / count).max(MIN_TAB_WIDTH);
    let home = dirs::home_dir();

    let mut spans = Vec::new();
    let mut used = 0;
    for session in manager.sessions() {
        if used >= total_width {
            break;
        }
        let width = tab_width.min(total_width - used);

        let marker = match session.status() {
            SessionStatus::Running => "*",
            SessionStatus::Queued { .. } => "+",
            SessionStatus::Ready => "",
        };
        let label = format!(
            " [{}]{} {} ",
            session.id + 1,
            marker,
            shorten_path(session.directory(), home.as_deref())
        );
        let label = fit(&label, width.saturating_sub(1));

        let is_active = session.id == manager.active_index();
        let style = if is_active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        spans.push(Span::styled("│", paint(Style::default().fg(Color::DarkGray), settings)));
        let text = if is_active {
            format!("{:^w$}", label, w = width.saturating_sub(1))
        } else {
            format!("{:<w$}", label, w = width.saturating_sub(1))
        };
        spans.push(Span::styled(text, paint(style, settings)));
        used += width;
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Truncate a tab label so it fits `width` columns, marking the cut with `...`
fn fit(label: &str, width: usize) -> String {
    let len = label.chars().count();
    if len <= width {
        return label.to_string();
    }
    if width <= 4 {
        return label.chars().take(width).collect();
    }
    let mut out: String = label.chars().take(width - 4).collect();
    out.push_str("... ");
    out
}
