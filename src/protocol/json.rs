//! JSON envelope format

use super::{ChatEvent, ChatMessage, ChatProtocol, Inbound, ProtocolError, ProtocolKind, RenderedRow};

/// Frames are JSON objects tagged by `type`.
///
/// Outbound: `new_user` on join, `user_message` per chat line.
/// Inbound: `notice`, `user_message` or `error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonProtocol;

impl JsonProtocol {
    fn encode(msg: &ChatMessage) -> Result<String, ProtocolError> {
        serde_json::to_string(msg).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
}

impl ChatProtocol for JsonProtocol {
    fn kind(&self) -> ProtocolKind {
        ProtocolKind::Json
    }

    fn join_frame(&self, username: &str) -> Result<String, ProtocolError> {
        Self::encode(&ChatMessage::NewUser {
            username: username.to_string(),
        })
    }

    fn message_frame(&self, message: &str) -> Result<String, ProtocolError> {
        Self::encode(&ChatMessage::UserMessage {
            message: message.to_string(),
        })
    }

    fn decode(&self, raw: &str) -> Result<Inbound, ProtocolError> {
        let event: ChatEvent =
            serde_json::from_str(raw).map_err(|e| ProtocolError::Decode(e.to_string()))?;

        match event {
            ChatEvent::Error { message } => Ok(Inbound::ServerError(message)),
            event => RenderedRow::from_event(event)
                .map(Inbound::Row)
                .ok_or_else(|| ProtocolError::Decode("event has no row".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_frame_shape() {
        let frame = JsonProtocol.join_frame("bob").unwrap();
        assert_eq!(frame, r#"{"type":"new_user","username":"bob"}"#);
    }

    #[test]
    fn test_message_frame_shape() {
        let frame = JsonProtocol.message_frame("hello there").unwrap();
        assert_eq!(frame, r#"{"type":"user_message","message":"hello there"}"#);
    }

    #[test]
    fn test_message_frame_escapes_quotes() {
        let frame = JsonProtocol.message_frame(r#"say "hi""#).unwrap();
        let parsed: ChatMessage = serde_json::from_str(&frame).unwrap();
        assert_eq!(
            parsed,
            ChatMessage::UserMessage {
                message: r#"say "hi""#.to_string()
            }
        );
    }

    #[test]
    fn test_decode_unknown_type_is_error() {
        let result = JsonProtocol.decode(r#"{"type":"presence","username":"x"}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
