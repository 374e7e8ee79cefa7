//! wschat - a terminal chat client for WebSocket chat servers

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use wschat::client::{self, ClientOptions};
use wschat::config::Config;
use wschat::protocol::ProtocolKind;

#[derive(Parser)]
#[command(name = "wschat")]
#[command(about = "A terminal chat client for WebSocket chat servers")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Chat server host
    #[arg(long)]
    host: Option<String>,

    /// Chat server port (defaults depend on the protocol)
    #[arg(short, long)]
    port: Option<u16>,

    /// Wire format spoken by the server
    #[arg(long, value_enum)]
    protocol: Option<ProtocolKind>,

    /// Pre-fill the connect form with this username
    #[arg(short, long)]
    username: Option<String>,
}

impl Cli {
    /// Layer command-line flags over the config file
    fn into_options(self, config: &Config) -> ClientOptions {
        let mut options = ClientOptions::from_config(config);

        if let Some(protocol) = self.protocol {
            options.protocol = protocol;
            options.endpoint = config.connection.endpoint(protocol);
        }
        if let Some(host) = self.host {
            options.endpoint.host = host;
        }
        if let Some(port) = self.port {
            options.endpoint.port = port;
        }
        if self.username.is_some() {
            options.username = self.username;
        }

        options
    }
}

/// Log to a file: the terminal belongs to the UI
fn init_logging() -> Result<()> {
    let log_path = Config::log_path();
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let options = cli.into_options(&config);

    tracing::info!(
        "Starting wschat for {} ({})",
        options.endpoint,
        options.protocol
    );

    client::run(options).await
}
