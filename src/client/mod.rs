//! Client - user-facing terminal interface
//!
//! The run-loop owns the screen. Before connecting it drives the connect
//! form directly; once the user submits a username the [`App`] is handed to
//! a [`Session`], which from then on decides what the screen shows.

mod app;
mod input;
pub mod transport;
mod ui;

pub use app::{App, ChatLine, LineEditor};
pub use input::{map_key, UiAction};

use crate::config::Config;
use crate::protocol::{Endpoint, ProtocolKind};
use crate::session::{
    validate_username, ChatDisplay, Session, SessionError, SessionOptions, StatusClass,
};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::Stdout;
use std::time::Duration;
use tokio::sync::mpsc;
use transport::{spawn_connection, SocketEvent, WsTransport};

const SCROLL_PAGE: usize = 10;

/// Resolved client settings
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub endpoint: Endpoint,
    pub protocol: ProtocolKind,
    pub username: Option<String>,
    pub session: SessionOptions,
    pub connect_timeout: Duration,
    pub show_timestamps: bool,
    pub history_limit: usize,
}

impl ClientOptions {
    /// Settings from config alone
    pub fn from_config(config: &Config) -> Self {
        let protocol = config.connection.protocol;
        let username = Some(config.session.username.clone()).filter(|u| !u.is_empty());
        Self {
            endpoint: config.connection.endpoint(protocol),
            protocol,
            username,
            session: SessionOptions {
                allow_empty_username: config.session.allow_empty_username,
            },
            connect_timeout: config.connection.connect_timeout(),
            show_timestamps: config.appearance.show_timestamps,
            history_limit: config.appearance.history_limit,
        }
    }

    fn new_app(&self) -> App {
        let mut app = App::new(self.endpoint.clone(), self.protocol);
        app.show_timestamps = self.show_timestamps;
        app.history_limit = self.history_limit;
        if let Some(username) = &self.username {
            app.username_editor.set(username);
        }
        app
    }
}

/// Screen ownership: the connect form, or a live session
enum Stage {
    Form(App),
    Live(Session<App, WsTransport>),
}

impl Stage {
    fn app(&self) -> &App {
        match self {
            Stage::Form(app) => app,
            Stage::Live(session) => session.display(),
        }
    }
}

enum LoopEvent {
    Terminal(Event),
    Socket(SocketEvent),
}

/// Run the chat client until the user quits
pub async fn run(options: ClientOptions) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_client_loop(&mut terminal, options).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Main client loop
async fn run_client_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    options: ClientOptions,
) -> Result<()> {
    let (input_tx, mut input_rx) = mpsc::channel(100);
    let (socket_tx, mut socket_rx) = mpsc::unbounded_channel();

    // Input thread
    std::thread::spawn(move || loop {
        match event::read() {
            Ok(event) => {
                if input_tx.blocking_send(event).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::error!("Failed to read terminal event: {}", e);
                break;
            }
        }
    });

    let mut stage = Stage::Form(options.new_app());
    // Every key press is one user action
    let mut action_seq: u64 = 0;

    loop {
        terminal.draw(|f| ui::draw(f, stage.app()))?;

        let event = tokio::select! {
            Some(event) = input_rx.recv() => LoopEvent::Terminal(event),
            Some(event) = socket_rx.recv() => LoopEvent::Socket(event),
            else => break,
        };

        match event {
            LoopEvent::Terminal(Event::Key(key)) => {
                action_seq += 1;
                let action = map_key(&key);
                if action == UiAction::Quit {
                    break;
                }
                stage = handle_action(stage, action, action_seq, &options, &socket_tx)?;
            }
            // Resizes just need the redraw at the top of the loop
            LoopEvent::Terminal(_) => {}
            LoopEvent::Socket(event) => {
                if let Stage::Live(session) = &mut stage {
                    handle_socket_event(session, event);
                }
            }
        }
    }

    tracing::info!("Client loop finished");
    Ok(())
}

fn handle_action(
    stage: Stage,
    action: UiAction,
    action_seq: u64,
    options: &ClientOptions,
    socket_tx: &mpsc::UnboundedSender<SocketEvent>,
) -> Result<Stage> {
    match stage {
        Stage::Form(mut app) => {
            if !matches!(action, UiAction::Submit(_)) {
                app.focused_editor().apply(action);
                return Ok(Stage::Form(app));
            }

            let username = app.username_editor.content().to_string();
            if let Err(e) = validate_username(&username, options.session) {
                app.set_status(&e.to_string(), StatusClass::Error);
                return Ok(Stage::Form(app));
            }

            let (transport, outbound_rx) = WsTransport::new();
            let session = Session::connect(
                username,
                options.endpoint.clone(),
                options.protocol.build(),
                app,
                transport,
                options.session,
            )?;
            spawn_connection(
                session.endpoint().url(),
                options.connect_timeout,
                outbound_rx,
                socket_tx.clone(),
            );
            Ok(Stage::Live(session))
        }

        Stage::Live(mut session) => {
            match action {
                UiAction::Submit(trigger) => {
                    let message = session.display().chat_editor.content().to_string();
                    match session.submit(trigger, action_seq, &message) {
                        Ok(_) => {}
                        Err(SessionError::NotConnected) => {
                            tracing::warn!("Message not sent: connection is not up");
                        }
                        Err(e) => session.on_transport_error(&e.to_string()),
                    }
                }
                UiAction::ScrollUp => session.display_mut().scroll_up(SCROLL_PAGE),
                UiAction::ScrollDown => session.display_mut().scroll_down(SCROLL_PAGE),
                action => {
                    session.display_mut().focused_editor().apply(action);
                }
            }
            Ok(Stage::Live(session))
        }
    }
}

fn handle_socket_event(session: &mut Session<App, WsTransport>, event: SocketEvent) {
    match event {
        SocketEvent::Opened => {
            if let Err(e) = session.on_open() {
                session.on_transport_error(&e.to_string());
            }
        }
        SocketEvent::Frame(text) => {
            // Decode failures are already on the status line
            let _ = session.on_message(&text);
        }
        SocketEvent::Closed => session.on_close(),
        SocketEvent::Failed(reason) => session.on_transport_error(&reason),
    }
}
