//! Chat session - connection lifecycle and message exchange
//!
//! A [`Session`] owns everything one connection needs: the username, the
//! wire format, the outbound transport and the display it renders into.
//! It performs no I/O itself; the host feeds it transport events
//! ([`Session::on_open`], [`Session::on_message`], [`Session::on_close`],
//! [`Session::on_transport_error`]) and user actions ([`Session::submit`]).
//!
//! ```text
//! Disconnected --connect--> Connecting --on_open--> Connected
//!       ^                        |                      |
//!       +------ on_close / on_transport_error ----------+
//! ```

mod display;
mod error;

pub use display::{ChatDisplay, StatusClass, Transport};
pub use error::SessionError;

use crate::protocol::{ChatProtocol, Endpoint, Inbound, ProtocolKind, RenderedRow};
use uuid::Uuid;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// The two UI gestures that submit a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    /// The send button
    Click,

    /// The chat form itself (Enter)
    FormSubmit,
}

/// Session creation options
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Accept an empty (or all-whitespace) username
    pub allow_empty_username: bool,
}

/// Check a username before connecting
pub fn validate_username(username: &str, options: SessionOptions) -> Result<(), SessionError> {
    if username.trim().is_empty() && !options.allow_empty_username {
        return Err(SessionError::Validation(
            "username must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// One connection lifecycle, from connect until the socket goes away
pub struct Session<D, T> {
    id: Uuid,
    username: String,
    endpoint: Endpoint,
    state: ConnectionState,
    protocol: Box<dyn ChatProtocol>,
    display: D,
    transport: T,
    last_action: Option<u64>,
}

impl<D: ChatDisplay, T: Transport> Session<D, T> {
    /// Start a session.
    ///
    /// Hides the connect form and shows `Connecting...`. The caller opens
    /// the socket for `endpoint` and reports back through [`Session::on_open`].
    pub fn connect(
        username: impl Into<String>,
        endpoint: Endpoint,
        protocol: Box<dyn ChatProtocol>,
        mut display: D,
        transport: T,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        let username = username.into();
        validate_username(&username, options)?;

        let id = Uuid::new_v4();
        tracing::info!(
            session = %id,
            "Connecting to {} as {:?} ({})",
            endpoint.url(),
            username,
            protocol.kind()
        );

        display.hide_connect_form();
        display.set_status("Connecting...", StatusClass::Connecting);

        Ok(Self {
            id,
            username,
            endpoint,
            state: ConnectionState::Connecting,
            protocol,
            display,
            transport,
            last_action: None,
        })
    }

    /// Transport opened: announce ourselves and reveal the chat surface
    pub fn on_open(&mut self) -> Result<(), SessionError> {
        if self.state != ConnectionState::Connecting {
            tracing::warn!(session = %self.id, "Ignoring open event in state {:?}", self.state);
            return Ok(());
        }

        self.state = ConnectionState::Connected;
        self.display.set_status("Connected", StatusClass::Connected);
        self.display.reveal_chat_surface();
        tracing::info!(session = %self.id, "Connected to {}", self.endpoint);

        let frame = self.protocol.join_frame(&self.username)?;
        self.transport.send(frame)
    }

    /// Send one chat message and clear the input field.
    ///
    /// Fire-and-forget: the input is cleared as soon as the frame is queued.
    /// Before the connection is up nothing is sent and the input is kept.
    pub fn send_message(&mut self, message: &str) -> Result<(), SessionError> {
        if self.state != ConnectionState::Connected {
            return Err(SessionError::NotConnected);
        }

        let frame = self.protocol.message_frame(message)?;
        tracing::debug!(session = %self.id, "Sending {} bytes", frame.len());
        let sent = self.transport.send(frame);
        self.display.clear_input();
        sent
    }

    /// Handle a submit gesture for the user action numbered `action`.
    ///
    /// A click and a form submission raised by the same action send once;
    /// the duplicate returns `Ok(false)`. Any send attempt consumes the
    /// action, failed or not. A `NotConnected` refusal does not.
    pub fn submit(
        &mut self,
        trigger: SubmitTrigger,
        action: u64,
        message: &str,
    ) -> Result<bool, SessionError> {
        if self.last_action == Some(action) {
            tracing::debug!(session = %self.id, "Dropping duplicate {:?} for action {}", trigger, action);
            return Ok(false);
        }

        match self.send_message(message) {
            Err(SessionError::NotConnected) => Err(SessionError::NotConnected),
            sent => {
                self.last_action = Some(action);
                sent.map(|()| true)
            }
        }
    }

    /// Inbound text frame.
    ///
    /// Returns the row appended to the display, or `None` when the frame
    /// produced no row. Malformed frames are reported on the
    /// status line and returned as errors; the session stays usable.
    /// Frames arriving while not `Connected` are dropped.
    pub fn on_message(&mut self, raw: &str) -> Result<Option<RenderedRow>, SessionError> {
        if self.state != ConnectionState::Connected {
            tracing::debug!(session = %self.id, "Dropping frame in state {:?}", self.state);
            return Ok(None);
        }

        let inbound = match self.protocol.decode(raw) {
            Ok(inbound) => inbound,
            Err(e) => {
                tracing::warn!(session = %self.id, "Undecodable frame {:?}: {}", raw, e);
                self.display
                    .set_status(&format!("Invalid message: {}", e), StatusClass::Error);
                return Err(e.into());
            }
        };

        match inbound {
            Inbound::Row(row) => {
                tracing::debug!(session = %self.id, "Received {:?}", row);
                self.display.append_row(row.clone());
                Ok(Some(row))
            }
            Inbound::ServerError(message) => {
                tracing::warn!(session = %self.id, "Server error: {}", message);
                self.display
                    .set_status(&format!("Server error: {}", message), StatusClass::Error);
                Ok(None)
            }
        }
    }

    /// Server closed the connection
    pub fn on_close(&mut self) {
        tracing::info!(session = %self.id, "Connection to {} closed", self.endpoint);
        self.state = ConnectionState::Disconnected;
        self.display
            .set_status("Disconnected", StatusClass::Disconnected);
    }

    /// Connect failed or the connection broke
    pub fn on_transport_error(&mut self, reason: &str) {
        tracing::error!(session = %self.id, "Transport error on {}: {}", self.endpoint, reason);
        self.state = ConnectionState::Disconnected;
        self.display
            .set_status(&format!("Connection failed: {}", reason), StatusClass::Error);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn protocol_kind(&self) -> ProtocolKind {
        self.protocol.kind()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
