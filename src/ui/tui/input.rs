use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::UiAction;
use crate::session::{EditAction, SplitOrientation};

/// Decode a key press into an action for the control loop.
///
/// While `locked` only session shortcuts, scrolling and quitting are honored.
pub fn handle_key_event(key_event: KeyEvent, locked: bool) -> UiAction {
    if key_event.kind == KeyEventKind::Release {
        return UiAction::None;
    }

    let modifiers = key_event.modifiers;

    // Global shortcuts first
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match key_event.code {
            KeyCode::Char('c') | KeyCode::Char('d') => UiAction::QuitRequested,
            KeyCode::Char('t') => UiAction::NewSession,
            KeyCode::Char('w') => UiAction::CloseSession,
            _ => UiAction::None,
        };
    }

    if modifiers.contains(KeyModifiers::ALT) {
        return handle_alt_keys(key_event.code);
    }

    match key_event.code {
        KeyCode::Up if modifiers.contains(KeyModifiers::SHIFT) => {
            edit(EditAction::HistoryBack, locked)
        }
        KeyCode::Down if modifiers.contains(KeyModifiers::SHIFT) => {
            edit(EditAction::HistoryForward, locked)
        }
        KeyCode::Up => UiAction::ScrollUp,
        KeyCode::Down => UiAction::ScrollDown,
        KeyCode::Enter if !locked => UiAction::Submit,
        KeyCode::Left => edit(EditAction::Left, locked),
        KeyCode::Right => edit(EditAction::Right, locked),
        KeyCode::Home => edit(EditAction::Home, locked),
        KeyCode::End => edit(EditAction::End, locked),
        KeyCode::Backspace => edit(EditAction::Backspace, locked),
        KeyCode::Delete => edit(EditAction::Delete, locked),
        KeyCode::Char(c) => edit(EditAction::Insert(c), locked),
        _ => UiAction::None,
    }
}

fn handle_alt_keys(code: KeyCode) -> UiAction {
    match code {
        KeyCode::Char(digit @ '1'..='9') => UiAction::SwitchTo(digit as usize - '1' as usize),
        KeyCode::Char('=') | KeyCode::Char('+') => UiAction::NextSession,
        KeyCode::Char('-') => UiAction::PrevSession,
        KeyCode::Char('h') | KeyCode::Char('H') => UiAction::Split(SplitOrientation::Horizontal),
        KeyCode::Char('v') | KeyCode::Char('V') => UiAction::Split(SplitOrientation::Vertical),
        KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down => UiAction::SwitchToPartner,
        _ => UiAction::None,
    }
}

fn edit(action: EditAction, locked: bool) -> UiAction {
    if locked {
        UiAction::None
    } else {
        UiAction::Edit(action)
    }
}
