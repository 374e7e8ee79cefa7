//! Capabilities the session needs from its surroundings

use super::SessionError;
use crate::protocol::RenderedRow;

/// Visual class of the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusClass {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl StatusClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusClass::Disconnected => "disconnected",
            StatusClass::Connecting => "connecting",
            StatusClass::Connected => "connected",
            StatusClass::Error => "error",
        }
    }
}

/// Rendering surface driven by a session.
///
/// Mirrors the parts of a chat screen the session touches: the status line,
/// the chat list, the connect form, the chat surface and its input field.
pub trait ChatDisplay {
    fn set_status(&mut self, text: &str, class: StatusClass);

    fn append_row(&mut self, row: RenderedRow);

    fn reveal_chat_surface(&mut self);

    fn hide_connect_form(&mut self);

    /// Empty the chat input field
    fn clear_input(&mut self);
}

/// Outbound half of the connection owned by a session
pub trait Transport {
    /// Queue one text frame. Must not block.
    fn send(&mut self, frame: String) -> Result<(), SessionError>;
}
