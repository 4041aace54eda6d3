use anyhow::Result;
use clap::Parser;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{Layer as _, fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt};

use datakeeper_server::{AppConfig, observability, serve};

/// `-a`/`--addr` is a fallback; the effective address ultimately comes from
/// `AppConfig` (file or `DATAKEEPER_CONFIG`), mirroring the teacher's
/// config-over-flags precedence.
#[derive(Parser, Debug)]
struct ServerArgs {
  #[arg(short, long, default_value = "0.0.0.0:14444")]
  addr: String,
}

#[tokio::main]
async fn main() -> Result<()> {
  let layer = Layer::new().with_filter(LevelFilter::INFO);
  tracing_subscriber::registry().with(layer).init();

  let args = ServerArgs::parse();

  if let Err(e) = observability::init_observability().await {
    tracing::warn!(error = %e, "observability init failed, continuing without metrics");
  }

  let mut config = match AppConfig::load() {
    Ok(config) => config,
    Err(e) => {
      tracing::error!(error = %e, "failed to load configuration, falling back to CLI address");
      datakeeper_server::AppConfig {
        server: datakeeper_server::config::ServerConfig {
          addr: args.addr.clone(),
          db_url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/datakeeper".to_string()),
        },
        auth: datakeeper_server::config::AuthConfig {
          secret: std::env::var("DATAKEEPER_JWT_SECRET")
            .unwrap_or_else(|_| "insecure-development-secret".to_string()),
        },
      }
    }
  };

  if config.server.addr.is_empty() {
    config.server.addr = args.addr;
  }

  info!("starting datakeeper_server");

  let shutdown = async {
    shutdown_signal().await;
    info!("shutdown signal received, draining in-flight RPCs");
  };

  serve(config, shutdown).await
}

#[cfg(unix)]
async fn shutdown_signal() {
  use tokio::signal::unix::{SignalKind, signal};

  let mut sighup = signal(SignalKind::hangup()).expect("failed to register SIGHUP handler");
  let mut sigint = signal(SignalKind::interrupt()).expect("failed to register SIGINT handler");
  let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
  let mut sigquit = signal(SignalKind::quit()).expect("failed to register SIGQUIT handler");

  tokio::select! {
    _ = sighup.recv() => {}
    _ = sigint.recv() => {}
    _ = sigterm.recv() => {}
    _ = sigquit.recv() => {}
  }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
  let _ = tokio::signal::ctrl_c().await;
}
