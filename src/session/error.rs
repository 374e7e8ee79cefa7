//! Session error taxonomy

use crate::protocol::ProtocolError;
use thiserror::Error;

/// Errors surfaced by a chat session
#[derive(Debug, Error)]
pub enum SessionError {
    /// Connection refused, dropped, or the writer is gone
    #[error("Transport error: {0}")]
    Transport(String),

    /// Inbound frame could not be understood, or outbound could not be built
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("Invalid username: {0}")]
    Validation(String),

    #[error("Not connected")]
    NotConnected,
}

impl SessionError {
    /// True for malformed inbound frames
    pub fn is_decode(&self) -> bool {
        matches!(self, SessionError::Protocol(ProtocolError::Decode(_)))
    }
}
