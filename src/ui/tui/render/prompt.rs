use chrono::Local;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::session::{COMMAND_QUEUE_CAPACITY, QueueState, Session, SessionStatus};
use crate::ui::tui::RenderSettings;

use super::paint;

pub(super) fn render_prompt(
    frame: &mut Frame<'_>,
    area: Rect,
    session: &mut Session,
    settings: &RenderSettings,
) {
    let clock = Local::now()
        .format(settings.time_format.prompt_pattern())
        .to_string();
    let clock_style = if session.queue.state() == QueueState::Full {
        Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK)
    } else {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    };

    let indicator = match session.status() {
        SessionStatus::Running => Some((
            "[RUNNING] ".to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        SessionStatus::Queued { depth } => Some((
            format!("[QUEUED:{}/{}] ", depth, COMMAND_QUEUE_CAPACITY),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        SessionStatus::Ready => None,
    };

    let mut prompt_len = clock.chars().count() + 1;
    let mut spans = vec![
        Span::styled(clock, paint(clock_style, settings)),
        Span::raw(" "),
    ];
    if let Some((text, style)) = indicator {
        prompt_len += text.chars().count();
        spans.push(Span::styled(text, paint(style, settings)));
    }

    let available = (area.width as usize).saturating_sub(prompt_len + 2).max(1);

    if session.input.is_locked() {
        spans.push(Span::styled(
            "#".repeat(available),
            paint(
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                settings,
            ),
        ));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
        return;
    }

    let (visible, cursor_col) = session.input.visible_window(available);
    spans.push(Span::raw(visible));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);

    let x = area.x as usize + prompt_len + cursor_col;
    let max_x = (area.x + area.width).saturating_sub(1) as usize;
    frame.set_cursor(x.min(max_x) as u16, area.y);
}
