//! Protocol definitions for client-server communication
//!
//! Two incompatible wire formats are supported, each behind [`ChatProtocol`]:
//! - [`JsonProtocol`]: JSON envelopes tagged by `type`
//! - [`RawProtocol`]: bare text frames, no envelope

mod json;
mod message;
mod raw;

pub use json::JsonProtocol;
pub use message::{ChatEvent, ChatMessage, RenderedRow, NOTICE_USERNAME};
pub use raw::RawProtocol;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Default port of JSON chat servers
pub const DEFAULT_JSON_PORT: u16 = 8000;

/// Default port of raw-text chat servers
pub const DEFAULT_RAW_PORT: u16 = 8002;

/// Protocol-specific errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Decode(String),

    #[error("Failed to encode message: {0}")]
    Encode(String),
}

/// What an inbound frame turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A line for the chat list
    Row(RenderedRow),

    /// The server rejected something we sent
    ServerError(String),
}

/// A wire format for one chat session
pub trait ChatProtocol: Send {
    /// Which format this is
    fn kind(&self) -> ProtocolKind;

    /// Frame announcing `username` once the socket opens
    fn join_frame(&self, username: &str) -> Result<String, ProtocolError>;

    /// Frame carrying one chat message
    fn message_frame(&self, message: &str) -> Result<String, ProtocolError>;

    /// Interpret one inbound text frame
    fn decode(&self, raw: &str) -> Result<Inbound, ProtocolError>;
}

/// Selectable wire formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolKind {
    /// JSON envelopes (`new_user`, `user_message`, `notice`)
    #[default]
    Json,

    /// Raw text frames carrying pre-rendered markup
    Raw,
}

impl ProtocolKind {
    /// Instantiate the protocol
    pub fn build(self) -> Box<dyn ChatProtocol> {
        match self {
            ProtocolKind::Json => Box::new(JsonProtocol),
            ProtocolKind::Raw => Box::new(RawProtocol),
        }
    }

    /// Port servers speaking this format usually listen on
    pub fn default_port(self) -> u16 {
        match self {
            ProtocolKind::Json => DEFAULT_JSON_PORT,
            ProtocolKind::Raw => DEFAULT_RAW_PORT,
        }
    }
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolKind::Json => write!(f, "json"),
            ProtocolKind::Raw => write!(f, "raw"),
        }
    }
}

/// Address of a chat server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Plaintext WebSocket URL at the server root
    pub fn url(&self) -> String {
        format!("ws://{}:{}/", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
