use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use smartlight::FeedKind;
use smartlight_core::config::Config;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "smartlight", about = "Smart Light backend, STM32 telemetry from MQTT to a polling dashboard")]
struct Cli {
    /// TOML config file. Defaults to ./smartlight.toml if present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dotenv file with NETPIE_* credentials. Ignored if missing.
    #[arg(long, default_value = "config.env")]
    env_file: PathBuf,

    /// Message source.
    #[arg(long, value_enum, default_value_t = FeedKind::Mqtt)]
    feed: FeedKind,

    /// HTTP port, overriding config and $PORT.
    #[arg(long)]
    port: Option<u16>,

    /// Log at debug level regardless of RUST_LOG.
    #[arg(long)]
    debug: bool,

    /// Append logs to this file instead of stderr (tail -f to inspect).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = dotenvy::from_path(&cli.env_file) {
        if !e.not_found() {
            return Err(e).with_context(|| format!("failed to read {}", cli.env_file.display()));
        }
    }

    init_tracing(&cli)?;

    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(port) = cli.port {
        config.http.port = port;
    }
    tracing::debug!(?config, "configuration loaded");

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    smartlight::run(config, cli.feed, shutdown).await
}

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    let filter = if cli.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_env_filter(filter)
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown requested");
    shutdown.cancel();
}
