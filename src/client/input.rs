//! Input handling - map terminal keys to UI actions

use crate::session::SubmitTrigger;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press asks the UI to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Insert(char),
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    DeleteWordBackward,
    DeleteToStart,
    DeleteToEnd,

    /// Submit the focused form
    Submit(SubmitTrigger),

    ScrollUp,
    ScrollDown,
    Quit,

    /// Key with no binding
    Ignore,
}

/// Map a key event to an action
///
/// Enter submits the form, Ctrl+S acts as the send button.
pub fn map_key(key: &KeyEvent) -> UiAction {
    if key.kind != KeyEventKind::Press {
        return UiAction::Ignore;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => UiAction::Quit,
            KeyCode::Char('s') => UiAction::Submit(SubmitTrigger::Click),
            KeyCode::Char('a') => UiAction::CursorHome,
            KeyCode::Char('e') => UiAction::CursorEnd,
            KeyCode::Char('w') => UiAction::DeleteWordBackward,
            KeyCode::Char('u') => UiAction::DeleteToStart,
            KeyCode::Char('k') => UiAction::DeleteToEnd,
            _ => UiAction::Ignore,
        };
    }

    match key.code {
        KeyCode::Enter => UiAction::Submit(SubmitTrigger::FormSubmit),
        KeyCode::Esc => UiAction::Quit,
        KeyCode::Char(c) => UiAction::Insert(c),
        KeyCode::Backspace => UiAction::Backspace,
        KeyCode::Delete => UiAction::Delete,
        KeyCode::Left => UiAction::CursorLeft,
        KeyCode::Right => UiAction::CursorRight,
        KeyCode::Home => UiAction::CursorHome,
        KeyCode::End => UiAction::CursorEnd,
        KeyCode::PageUp | KeyCode::Up => UiAction::ScrollUp,
        KeyCode::PageDown | KeyCode::Down => UiAction::ScrollDown,
        _ => UiAction::Ignore,
    }
}
