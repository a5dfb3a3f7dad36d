//! duet-server: WebSocket signaling server for random 1:1 video chat.
//!
//! Accepts WebSocket connections, pairs waiting clients in arrival order,
//! hands each pair a media room and per-member join tokens, then relays
//! chat, typing, and screen-share notices between the two partners. Media
//! itself never passes through here.

mod connection;
mod health;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_tungstenite::accept_async_with_config;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tracing::{debug, info, warn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use duet_config::{DuetConfig, ServerConfig};
use duet_match::{MatchSettings, Matchmaker};

use crate::connection::handle_connection;

#[derive(Parser)]
#[command(name = "duet-server", about = "Signaling server for random 1:1 video chat")]
struct Args {
    /// Config file. Defaults to the platform config dir.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// WebSocket port; overrides `server.port`.
    #[arg(short, long)]
    port: Option<u16>,

    /// Liveness port; overrides `server.health_port`.
    #[arg(long)]
    health_port: Option<u16>,

    /// Log level for duet targets (debug, info, warn, error). `RUST_LOG` wins.
    #[arg(long)]
    log_level: Option<String>,
}

/// Per-socket limits taken from `[server]`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SocketLimits {
    pub max_message_bytes: usize,
    pub handshake_timeout: Duration,
}

impl From<&ServerConfig> for SocketLimits {
    fn from(config: &ServerConfig) -> Self {
        Self {
            max_message_bytes: config.max_message_bytes as usize,
            handshake_timeout: Duration::from_secs(u64::from(config.handshake_timeout_secs)),
        }
    }
}

impl SocketLimits {
    fn ws_config(&self) -> WebSocketConfig {
        WebSocketConfig::default()
            .max_message_size(Some(self.max_message_bytes))
            .max_frame_size(Some(self.max_message_bytes))
    }
}

#[tokio::main]
async fn main() -> duet_common::Result<()> {
    let args = Args::parse();

    // The configured level is unknown until the file is read, so loading
    // logs through a temporary subscriber at the CLI level (or info).
    let startup_level = args.log_level.as_deref().unwrap_or("info");
    let startup = startup_subscriber(startup_level, std::io::stdout);
    let config = tracing::subscriber::with_default(startup, || load_config(&args))?;

    let level = args
        .log_level
        .as_deref()
        .unwrap_or_else(|| config.logging.level.as_filter());
    tracing_subscriber::fmt().with_env_filter(env_filter(level)).init();

    let media = duet_media::provider_from_config(&config.media)?;
    let matchmaker = Matchmaker::new(media, MatchSettings::from(&config.matching));
    info!(provider = ?config.media.provider, "Media provider ready");

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let ws_addr = config.server.ws_addr();
    let listener = TcpListener::bind(&ws_addr).await?;
    info!("duet-server listening on {}", ws_addr);

    let health_addr = config.server.health_addr();
    let health_listener = TcpListener::bind(&health_addr).await?;
    info!("Liveness endpoint on http://{}/health", health_addr);

    let health_task = {
        let mut shutdown = shutdown_tx.subscribe();
        let router = health::router(matchmaker.clone());
        tokio::spawn(async move {
            let served = axum::serve(health_listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown.recv().await;
                })
                .await;
            if let Err(e) = served {
                warn!(error = %e, "Liveness server error");
            }
        })
    };

    let ws_task = tokio::spawn(serve_ws(
        listener,
        matchmaker,
        SocketLimits::from(&config.server),
        shutdown_tx.subscribe(),
    ));

    shutdown_signal().await;
    info!("Shutdown signal received");
    let _ = shutdown_tx.send(());

    let _ = ws_task.await;
    let _ = health_task.await;
    info!("duet-server stopped");
    Ok(())
}

/// Load the config file and apply command-line overrides.
fn load_config(args: &Args) -> duet_common::Result<DuetConfig> {
    let mut config = duet_config::load_config(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(port) = args.health_port {
        config.server.health_port = port;
    }
    duet_config::validation::validate(&config)?;
    Ok(config)
}

/// `RUST_LOG` when set, otherwise `level` for every duet target.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(level)))
}

fn startup_subscriber<W>(level: &str, writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(writer)
        .finish()
}

fn default_filter(level: &str) -> String {
    ["duet_server", "duet_match", "duet_media", "duet_config"]
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Accept loop. Each socket gets its own task; the loop exits when
/// `shutdown` fires.
pub(crate) async fn serve_ws(
    listener: TcpListener,
    matchmaker: Matchmaker,
    limits: SocketLimits,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    let matchmaker = matchmaker.clone();
                    tokio::spawn(async move {
                        let upgrade = accept_async_with_config(stream, Some(limits.ws_config()));
                        match tokio::time::timeout(limits.handshake_timeout, upgrade).await {
                            Ok(Ok(ws)) => handle_connection(ws, addr, matchmaker).await,
                            Ok(Err(e)) => {
                                warn!(peer = %addr, error = %e, "WS handshake failed");
                            }
                            Err(_) => {
                                warn!(
                                    peer = %addr,
                                    timeout = ?limits.handshake_timeout,
                                    "WS handshake timed out"
                                );
                            }
                        }
                    });
                }
                Err(e) => {
                    warn!(error = %e, "TCP accept error");
                }
            },
            _ = shutdown.recv() => {
                debug!("Accept loop stopping");
                break;
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
