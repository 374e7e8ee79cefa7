use crate::client::input::UiAction;
use crate::protocol::{Endpoint, ProtocolKind, RenderedRow};
use crate::session::{ChatDisplay, StatusClass};
use chrono::{DateTime, Local};

/// A chat row with the time it arrived
#[derive(Debug, Clone)]
pub struct ChatLine {
    pub row: RenderedRow,
    pub received_at: DateTime<Local>,
}

/// Input line editor with cursor position tracking
#[derive(Debug, Default)]
pub struct LineEditor {
    pub buffer: String,
    pub cursor: usize,
}

impl LineEditor {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
        }
    }

    pub fn content(&self) -> &str {
        &self.buffer
    }

    /// Text left of the cursor
    pub fn before_cursor(&self) -> &str {
        &self.buffer[..self.cursor]
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn insert(&mut self, c: char) {
        if self.cursor > self.buffer.len() {
            self.cursor = self.buffer.len();
        }
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor > 0 {
            let prev_cursor = self.buffer[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.buffer.remove(prev_cursor);
            self.cursor = prev_cursor;
            true
        } else {
            false
        }
    }

    pub fn delete(&mut self) -> bool {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
            true
        } else {
            false
        }
    }

    pub fn move_left(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor = self.buffer[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            true
        } else {
            false
        }
    }

    pub fn move_right(&mut self) -> bool {
        if self.cursor < self.buffer.len() {
            self.cursor = self.buffer[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.buffer.len());
            true
        } else {
            false
        }
    }

    pub fn delete_word_backward(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let trimmed_end = self.buffer[..self.cursor].trim_end();
        let word_start = trimmed_end
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);

        self.buffer.drain(word_start..self.cursor);
        self.cursor = word_start;
        true
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    pub fn set(&mut self, content: &str) {
        self.buffer = content.to_string();
        self.cursor = self.buffer.len();
    }

    /// Apply an editing action; returns false for non-editing actions
    pub fn apply(&mut self, action: UiAction) -> bool {
        match action {
            UiAction::Insert(c) => {
                self.insert(c);
                true
            }
            UiAction::Backspace => self.backspace(),
            UiAction::Delete => self.delete(),
            UiAction::CursorLeft => self.move_left(),
            UiAction::CursorRight => self.move_right(),
            UiAction::CursorHome => {
                self.cursor = 0;
                true
            }
            UiAction::CursorEnd => {
                self.cursor = self.buffer.len();
                true
            }
            UiAction::DeleteWordBackward => self.delete_word_backward(),
            UiAction::DeleteToStart => {
                self.buffer.drain(..self.cursor);
                self.cursor = 0;
                true
            }
            UiAction::DeleteToEnd => {
                self.buffer.truncate(self.cursor);
                true
            }
            UiAction::Submit(_)
            | UiAction::ScrollUp
            | UiAction::ScrollDown
            | UiAction::Quit
            | UiAction::Ignore => false,
        }
    }
}

/// Terminal chat screen state.
///
/// Starts on the connect form; the session hides it and reveals the chat
/// surface as the connection comes up.
pub struct App {
    pub connect_form_visible: bool,
    pub chat_visible: bool,
    pub status: String,
    pub status_class: StatusClass,
    pub rows: Vec<ChatLine>,
    pub username_editor: LineEditor,
    pub chat_editor: LineEditor,
    pub scroll_offset: usize,
    pub show_timestamps: bool,
    pub history_limit: usize,
    pub endpoint: Endpoint,
    pub protocol: ProtocolKind,
}

impl App {
    pub fn new(endpoint: Endpoint, protocol: ProtocolKind) -> Self {
        Self {
            connect_form_visible: true,
            chat_visible: false,
            status: String::new(),
            status_class: StatusClass::Disconnected,
            rows: Vec::new(),
            username_editor: LineEditor::new(),
            chat_editor: LineEditor::new(),
            scroll_offset: 0,
            show_timestamps: true,
            history_limit: 1000,
            endpoint,
            protocol,
        }
    }

    /// The editor keystrokes currently go to
    pub fn focused_editor(&mut self) -> &mut LineEditor {
        if self.connect_form_visible {
            &mut self.username_editor
        } else {
            &mut self.chat_editor
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = (self.scroll_offset + lines).min(self.rows.len().saturating_sub(1));
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn is_scrolled(&self) -> bool {
        self.scroll_offset > 0
    }
}

impl ChatDisplay for App {
    fn set_status(&mut self, text: &str, class: StatusClass) {
        tracing::debug!("Status [{}]: {}", class.as_str(), text);
        self.status = text.to_string();
        self.status_class = class;
    }

    fn append_row(&mut self, row: RenderedRow) {
        self.rows.push(ChatLine {
            row,
            received_at: Local::now(),
        });
        if self.rows.len() > self.history_limit {
            let excess = self.rows.len() - self.history_limit;
            self.rows.drain(0..excess);
        }

        // Keep the view pinned to the same rows while scrolled up
        if self.is_scrolled() {
            self.scroll_offset = (self.scroll_offset + 1).min(self.rows.len().saturating_sub(1));
        }
    }

    fn reveal_chat_surface(&mut self) {
        self.chat_visible = true;
    }

    fn hide_connect_form(&mut self) {
        self.connect_form_visible = false;
    }

    fn clear_input(&mut self) {
        self.chat_editor.clear();
    }
}
