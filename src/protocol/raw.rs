//! Raw text format: no envelope in either direction

use super::{ChatProtocol, Inbound, ProtocolError, ProtocolKind, RenderedRow};

/// The username and each message go out as the whole frame; inbound frames
/// are treated as ready-made fragments and never parsed or escaped.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawProtocol;

impl ChatProtocol for RawProtocol {
    fn kind(&self) -> ProtocolKind {
        ProtocolKind::Raw
    }

    fn join_frame(&self, username: &str) -> Result<String, ProtocolError> {
        Ok(username.to_string())
    }

    fn message_frame(&self, message: &str) -> Result<String, ProtocolError> {
        Ok(message.to_string())
    }

    fn decode(&self, raw: &str) -> Result<Inbound, ProtocolError> {
        Ok(Inbound::Row(RenderedRow::Fragment(raw.to_string())))
    }
}
