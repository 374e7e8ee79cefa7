//! Message types for the JSON chat protocol

use serde::{Deserialize, Serialize};

/// Display name shown for server notices, whatever the frame says
pub const NOTICE_USERNAME: &str = "*Server Message*";

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatMessage {
    /// Join announcement, sent once when the socket opens
    NewUser { username: String },

    /// Chat body; the author is implied by the connection
    UserMessage { message: String },
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Server-originated announcement (joins and the like).
    ///
    /// Servers usually leave `username` out of notices.
    Notice {
        #[serde(default)]
        datetime: String,
        #[serde(default)]
        username: String,
        #[serde(default)]
        message: String,
    },

    /// Ordinary chat line
    UserMessage {
        #[serde(default)]
        datetime: String,
        #[serde(default)]
        username: String,
        #[serde(default)]
        message: String,
    },

    /// Rejection of something the client sent
    Error {
        #[serde(default)]
        message: String,
    },
}

/// One entry in the chat list, as handed to the display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedRow {
    /// Structured row: timestamp, author, body
    Cells {
        datetime: String,
        username: String,
        message: String,
    },

    /// Opaque pre-rendered markup, shown as-is
    Fragment(String),
}

impl RenderedRow {
    /// Build the row for an inbound chat event.
    ///
    /// Returns `None` for events that are not chat lines.
    pub fn from_event(event: ChatEvent) -> Option<Self> {
        match event {
            ChatEvent::Notice {
                datetime, message, ..
            } => Some(RenderedRow::Cells {
                datetime,
                username: NOTICE_USERNAME.to_string(),
                message,
            }),
            ChatEvent::UserMessage {
                datetime,
                username,
                message,
            } => Some(RenderedRow::Cells {
                datetime,
                username,
                message,
            }),
            ChatEvent::Error { .. } => None,
        }
    }

    /// The three display cells in order, with the timestamp bracketed
    pub fn cells(&self) -> Option<[String; 3]> {
        match self {
            RenderedRow::Cells {
                datetime,
                username,
                message,
            } => Some([
                format!("[{}]", datetime),
                username.clone(),
                message.clone(),
            ]),
            RenderedRow::Fragment(_) => None,
        }
    }

    /// HTML table-row body for this entry.
    ///
    /// Cell values are placed directly, so a value that looks like a
    /// placeholder never bleeds into another cell. Fragments are returned
    /// untouched.
    pub fn to_html(&self) -> String {
        match self {
            RenderedRow::Cells {
                datetime,
                username,
                message,
            } => format!(
                "<td>[{}]</td><td>{}</td><td>{}</td>",
                datetime, username, message
            ),
            RenderedRow::Fragment(markup) => markup.clone(),
        }
    }
}
