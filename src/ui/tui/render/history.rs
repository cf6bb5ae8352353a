use std::ops::Range;
use std::path::Path;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::paths::expand_tilde;
use crate::session::{HistoryEntry, LineKind, Session};
use crate::ui::tui::RenderSettings;

use super::paint;

const ERROR_KEYWORDS: &[&str] = &[
    "error",
    "Error",
    "ERROR",
    "No such",
    "Permission denied",
    "command not found",
    "fail",
    "Fail",
    "FAIL",
];

/// How a whitespace-separated token of output is highlighted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenClass {
    Directory,
    File,
    PathLike,
    Error,
    Plain,
}

/// `focus` is `Some` when the pane is half of a split
pub(super) fn render_history(
    frame: &mut Frame<'_>,
    area: Rect,
    session: &Session,
    settings: &RenderSettings,
    focus: Option<bool>,
) {
    let inner = match focus {
        Some(active) => {
            let border = if active { Color::Cyan } else { Color::DarkGray };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(paint(Style::default().fg(border), settings))
                .title(format!(" [{}] ", session.id + 1));
            let inner = block.inner(area);
            frame.render_widget(block, area);
            inner
        }
        None => area,
    };

    if inner.height == 0 {
        return;
    }

    let height = inner.height as usize;
    let log = &session.history;
    let mut lines = Vec::new();
    for index in visible_range(log.len(), log.scroll_offset(), height) {
        if let Some(entry) = log.get(index) {
            lines.extend(highlight_entry(entry, session.directory(), settings));
        }
    }

    // Multi-line entries can overflow the viewport; keep the newest rows
    let skip = lines.len().saturating_sub(height);
    let lines: Vec<Line> = lines.into_iter().skip(skip).collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Entry indices shown for `height` rows, `offset` entries up from the newest
fn visible_range(len: usize, offset: usize, height: usize) -> Range<usize> {
    let start = len.saturating_sub(height + offset);
    let end = (start + height).min(len);
    start..end
}

fn highlight_entry(
    entry: &HistoryEntry,
    cwd: &Path,
    settings: &RenderSettings,
) -> Vec<Line<'static>> {
    entry
        .text
        .split('\n')
        .map(|row| match entry.kind {
            LineKind::Raw => Line::from(row.to_string()),
            LineKind::Command => highlight_command(row, settings),
            LineKind::Output => highlight_output(row, cwd, settings),
        })
        .collect()
}

fn highlight_command(text: &str, settings: &RenderSettings) -> Line<'static> {
    match text.find(']') {
        Some(end) if text.starts_with('[') => Line::from(vec![
            Span::styled(
                text[..=end].to_string(),
                paint(Style::default().fg(Color::Yellow), settings),
            ),
            Span::raw(text[end + 1..].to_string()),
        ]),
        _ => Line::from(text.to_string()),
    }
}

fn highlight_output(text: &str, cwd: &Path, settings: &RenderSettings) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, token) in text.split(' ').enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        if token.is_empty() {
            continue;
        }
        let style = match classify_token(token, cwd) {
            TokenClass::Directory => Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            TokenClass::File => Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            TokenClass::PathLike => Style::default().fg(Color::Blue).add_modifier(Modifier::DIM),
            TokenClass::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            TokenClass::Plain => Style::default(),
        };
        spans.push(Span::styled(token.to_string(), paint(style, settings)));
    }
    Line::from(spans)
}

fn classify_token(token: &str, cwd: &Path) -> TokenClass {
    let home = dirs::home_dir();
    let path = expand_tilde(token, home.as_deref());
    let resolved = if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    };

    let exists = resolved.exists();
    let looks_like_path = token.contains('/')
        || token.starts_with("./")
        || token.starts_with("../")
        || token.starts_with("~/");

    if exists {
        if resolved.is_dir() {
            TokenClass::Directory
        } else {
            TokenClass::File
        }
    } else if looks_like_path {
        TokenClass::PathLike
    } else if ERROR_KEYWORDS.iter().any(|kw| token.contains(kw)) {
        TokenClass::Error
    } else {
        TokenClass::Plain
    }
}
