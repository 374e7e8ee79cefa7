//! Integration tests for the chat session state machine

use proptest::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wschat::protocol::{ChatProtocol, Endpoint, ProtocolKind, RenderedRow, NOTICE_USERNAME};
use wschat::session::{
    ChatDisplay, ConnectionState, Session, SessionError, SessionOptions, StatusClass,
    SubmitTrigger, Transport,
};

/// Display that records every call
#[derive(Debug, Default)]
struct RecordingDisplay {
    connect_form_visible: bool,
    chat_visible: bool,
    status: String,
    status_class: StatusClass,
    rows: Vec<RenderedRow>,
    input_clears: usize,
}

impl RecordingDisplay {
    fn new() -> Self {
        Self {
            connect_form_visible: true,
            ..Default::default()
        }
    }
}

impl ChatDisplay for RecordingDisplay {
    fn set_status(&mut self, text: &str, class: StatusClass) {
        self.status = text.to_string();
        self.status_class = class;
    }

    fn append_row(&mut self, row: RenderedRow) {
        self.rows.push(row);
    }

    fn reveal_chat_surface(&mut self) {
        self.chat_visible = true;
    }

    fn hide_connect_form(&mut self) {
        self.connect_form_visible = false;
    }

    fn clear_input(&mut self) {
        self.input_clears += 1;
    }
}

/// Transport that keeps sent frames where the test can see them
#[derive(Clone, Default)]
struct RecordingTransport {
    sent: Rc<RefCell<Vec<String>>>,
    fail: Rc<Cell<bool>>,
}

impl RecordingTransport {
    fn frames(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, frame: String) -> Result<(), SessionError> {
        if self.fail.get() {
            return Err(SessionError::Transport("broken pipe".to_string()));
        }
        self.sent.borrow_mut().push(frame);
        Ok(())
    }
}

type TestSession = Session<RecordingDisplay, RecordingTransport>;

fn connect(username: &str, kind: ProtocolKind) -> (TestSession, RecordingTransport) {
    let transport = RecordingTransport::default();
    let session = Session::connect(
        username,
        Endpoint::new("localhost", kind.default_port()),
        kind.build(),
        RecordingDisplay::new(),
        transport.clone(),
        SessionOptions::default(),
    )
    .expect("connect failed");
    (session, transport)
}

fn connected(username: &str, kind: ProtocolKind) -> (TestSession, RecordingTransport) {
    let (mut session, transport) = connect(username, kind);
    session.on_open().expect("open failed");
    (session, transport)
}

#[test]
fn test_connect_shows_connecting() {
    let (session, transport) = connect("bob", ProtocolKind::Json);

    assert_eq!(session.state(), ConnectionState::Connecting);
    assert_eq!(session.username(), "bob");
    assert_eq!(session.endpoint().url(), "ws://localhost:8000/");

    let display = session.display();
    assert!(!display.connect_form_visible);
    assert!(!display.chat_visible);
    assert_eq!(display.status, "Connecting...");
    assert_eq!(display.status_class, StatusClass::Connecting);
    assert!(transport.frames().is_empty());
}

#[test]
fn test_bob_connects() {
    let (session, _transport) = connected("bob", ProtocolKind::Json);

    assert_eq!(session.state(), ConnectionState::Connected);
    let display = session.display();
    assert!(!display.connect_form_visible);
    assert!(display.chat_visible);
    assert_eq!(display.status, "Connected");
    assert_eq!(display.status_class, StatusClass::Connected);
}

#[test]
fn test_json_join_frame_on_open() {
    let (_session, transport) = connected("bob", ProtocolKind::Json);
    assert_eq!(
        transport.frames(),
        vec![r#"{"type":"new_user","username":"bob"}"#.to_string()]
    );
}

#[test]
fn test_raw_join_frame_on_open() {
    let (session, transport) = connected("bob", ProtocolKind::Raw);
    assert_eq!(session.endpoint().url(), "ws://localhost:8002/");
    assert_eq!(transport.frames(), vec!["bob".to_string()]);
}

#[test]
fn test_second_open_is_ignored() {
    let (mut session, transport) = connected("bob", ProtocolKind::Json);
    session.on_open().unwrap();
    assert_eq!(transport.frames().len(), 1);
}

#[test]
fn test_empty_username_rejected() {
    for username in ["", "   "] {
        let result = Session::connect(
            username,
            Endpoint::new("localhost", 8000),
            ProtocolKind::Json.build(),
            RecordingDisplay::new(),
            RecordingTransport::default(),
            SessionOptions::default(),
        );
        assert!(matches!(result, Err(SessionError::Validation(_))));
    }
}

#[test]
fn test_empty_username_allowed_when_configured() {
    let transport = RecordingTransport::default();
    let mut session = Session::connect(
        "",
        Endpoint::new("localhost", 8000),
        ProtocolKind::Json.build(),
        RecordingDisplay::new(),
        transport.clone(),
        SessionOptions {
            allow_empty_username: true,
        },
    )
    .expect("connect failed");
    session.on_open().unwrap();

    assert_eq!(
        transport.frames(),
        vec![r#"{"type":"new_user","username":""}"#.to_string()]
    );
}

#[test]
fn test_send_before_open_is_refused() {
    let (mut session, transport) = connect("bob", ProtocolKind::Json);

    let result = session.send_message("too early");

    assert!(matches!(result, Err(SessionError::NotConnected)));
    assert!(transport.frames().is_empty());
    assert_eq!(session.display().input_clears, 0);
}

#[test]
fn test_json_send_message() {
    let (mut session, transport) = connected("bob", ProtocolKind::Json);

    session.send_message("hello").unwrap();

    assert_eq!(
        transport.frames()[1],
        r#"{"type":"user_message","message":"hello"}"#
    );
    assert_eq!(session.display().input_clears, 1);
}

#[test]
fn test_raw_send_message() {
    let (mut session, transport) = connected("bob", ProtocolKind::Raw);

    session.send_message("hello <b>world</b>").unwrap();

    assert_eq!(transport.frames()[1], "hello <b>world</b>");
}

#[test]
fn test_send_failure_still_clears_input() {
    let (mut session, transport) = connected("bob", ProtocolKind::Json);
    transport.fail.set(true);

    let result = session.send_message("lost");

    assert!(matches!(result, Err(SessionError::Transport(_))));
    assert_eq!(session.display().input_clears, 1);
    assert_eq!(transport.frames().len(), 1);
}

#[test]
fn test_join_failure_is_reported() {
    let (mut session, transport) = connect("bob", ProtocolKind::Json);
    transport.fail.set(true);

    assert!(matches!(session.on_open(), Err(SessionError::Transport(_))));
}

#[test]
fn test_click_and_submit_for_one_action_send_once() {
    let (mut session, transport) = connected("bob", ProtocolKind::Json);

    let first = session.submit(SubmitTrigger::Click, 7, "hi").unwrap();
    let second = session.submit(SubmitTrigger::FormSubmit, 7, "hi").unwrap();

    assert!(first);
    assert!(!second);
    assert_eq!(transport.frames().len(), 2); // join + one message
    assert_eq!(session.display().input_clears, 1);
}

#[test]
fn test_separate_actions_both_send() {
    let (mut session, transport) = connected("bob", ProtocolKind::Json);

    assert!(session.submit(SubmitTrigger::FormSubmit, 1, "one").unwrap());
    assert!(session.submit(SubmitTrigger::FormSubmit, 2, "two").unwrap());

    assert_eq!(transport.frames().len(), 3);
}

#[test]
fn test_refused_submit_does_not_consume_action() {
    let (mut session, transport) = connect("bob", ProtocolKind::Json);

    assert!(session.submit(SubmitTrigger::Click, 1, "early").is_err());
    session.on_open().unwrap();
    assert!(session.submit(SubmitTrigger::Click, 1, "now").unwrap());

    assert_eq!(transport.frames().len(), 2);
}

#[test]
fn test_failed_send_still_consumes_action() {
    let (mut session, transport) = connected("bob", ProtocolKind::Json);
    transport.fail.set(true);

    let first = session.submit(SubmitTrigger::Click, 5, "hi");
    let second = session.submit(SubmitTrigger::FormSubmit, 5, "hi");

    assert!(matches!(first, Err(SessionError::Transport(_))));
    assert!(!second.unwrap());
    assert_eq!(session.display().input_clears, 1);

    transport.fail.set(false);
    assert!(session.submit(SubmitTrigger::FormSubmit, 6, "again").unwrap());
    assert_eq!(transport.frames().len(), 2);
}

#[test]
fn test_frames_after_close_are_dropped() {
    let (mut session, _transport) = connected("bob", ProtocolKind::Raw);
    session.on_close();

    let row = session.on_message("<li>late</li>").unwrap();

    assert!(row.is_none());
    assert!(session.display().rows.is_empty());
    assert_eq!(session.display().status, "Disconnected");
}

#[test]
fn test_json_message_received() {
    let (mut session, _transport) = connected("bob", ProtocolKind::Json);

    let row = session
        .on_message(r#"{"type":"user_message","datetime":"12:00","username":"alice","message":"hi"}"#)
        .unwrap()
        .expect("row expected");

    assert_eq!(
        row.cells(),
        Some(["[12:00]".to_string(), "alice".to_string(), "hi".to_string()])
    );
    assert_eq!(session.display().rows, vec![row]);
}

#[test]
fn test_raw_message_received_verbatim() {
    let (mut session, _transport) = connected("bob", ProtocolKind::Raw);

    session.on_message("<li>test</li>").unwrap();

    assert_eq!(
        session.display().rows,
        vec![RenderedRow::Fragment("<li>test</li>".to_string())]
    );
}

#[test]
fn test_malformed_frame_reported_and_session_survives() {
    let (mut session, _transport) = connected("bob", ProtocolKind::Json);

    let err = session.on_message("{oops").unwrap_err();
    assert!(err.is_decode());
    assert_eq!(session.display().status_class, StatusClass::Error);
    assert!(session.display().status.starts_with("Invalid message:"));
    assert!(session.display().rows.is_empty());
    assert_eq!(session.state(), ConnectionState::Connected);

    session
        .on_message(r#"{"type":"user_message","datetime":"1","username":"a","message":"b"}"#)
        .unwrap();
    assert_eq!(session.display().rows.len(), 1);
}

#[test]
fn test_server_error_frame_goes_to_status() {
    let (mut session, _transport) = connected("bob", ProtocolKind::Json);

    let row = session
        .on_message(r#"{"type":"error","message":"Invalid Message Type: shout"}"#)
        .unwrap();

    assert!(row.is_none());
    assert!(session.display().rows.is_empty());
    assert_eq!(
        session.display().status,
        "Server error: Invalid Message Type: shout"
    );
}

#[test]
fn test_transport_failure_while_connecting() {
    let (mut session, _transport) = connect("bob", ProtocolKind::Json);

    session.on_transport_error("Connection refused");

    assert_eq!(session.state(), ConnectionState::Disconnected);
    assert_eq!(session.display().status, "Connection failed: Connection refused");
    assert_eq!(session.display().status_class, StatusClass::Error);

    // No late open can resurrect it
    session.on_open().unwrap();
    assert_eq!(session.state(), ConnectionState::Disconnected);
}

#[test]
fn test_close_disconnects() {
    let (mut session, transport) = connected("bob", ProtocolKind::Json);

    session.on_close();

    assert_eq!(session.state(), ConnectionState::Disconnected);
    assert_eq!(session.display().status, "Disconnected");
    assert!(matches!(
        session.send_message("anyone?"),
        Err(SessionError::NotConnected)
    ));
    assert_eq!(transport.frames().len(), 1);
}

proptest! {
    #[test]
    fn prop_one_join_frame_per_open(username in "[^\\s]{1,8}[ -~]{0,16}", raw in any::<bool>()) {
        let kind = if raw { ProtocolKind::Raw } else { ProtocolKind::Json };
        let (_session, transport) = connected(&username, kind);

        let frames = transport.frames();
        prop_assert_eq!(frames.len(), 1);
        let expected = kind.build().join_frame(&username).unwrap();
        prop_assert_eq!(&frames[0], &expected);
    }

    #[test]
    fn prop_each_send_is_one_frame_one_clear(messages in proptest::collection::vec(".*", 0..8)) {
        let (mut session, transport) = connected("bob", ProtocolKind::Json);

        for message in &messages {
            session.send_message(message).unwrap();
        }

        prop_assert_eq!(transport.frames().len(), messages.len() + 1);
        prop_assert_eq!(session.display().input_clears, messages.len());
    }

    #[test]
    fn prop_notice_username_is_always_sentinel(username in ".*", message in ".*") {
        let (mut session, _transport) = connected("bob", ProtocolKind::Json);
        let raw = serde_json::json!({
            "type": "notice",
            "datetime": "2024-01-01 00:00:00",
            "username": username,
            "message": message,
        })
        .to_string();

        let row = session.on_message(&raw).unwrap().unwrap();
        match row {
            RenderedRow::Cells { username, .. } => prop_assert_eq!(username, NOTICE_USERNAME),
            other => prop_assert!(false, "unexpected row {:?}", other),
        }
    }
}
