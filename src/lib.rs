//! wschat - a terminal chat client for WebSocket chat servers
//!
//! This crate provides:
//! - The chat session state machine, independent of any I/O
//! - The two supported wire formats (JSON envelopes and raw text)
//! - A terminal front-end and WebSocket transport
//! - Configuration management
//!
//! # Architecture
//!
//! A [`session::Session`] is told about transport events and user actions,
//! and answers by queueing frames on its [`session::Transport`] and updating
//! its [`session::ChatDisplay`]. The [`client`] module supplies both: a
//! ratatui screen and a tokio-tungstenite connection task.

pub mod client;
pub mod config;
pub mod protocol;
pub mod session;
