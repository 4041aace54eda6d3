//! # Datakeeper Server
//!
//! - `config` — YAML/env configuration (C0a)
//! - `error` — the server-facing error taxonomy (C0b)
//! - `storage` — the record store and credential store (C1, C2)
//! - `auth` — the bearer-token auth gate (C4)
//! - `hub` — the per-user fan-out subscription hub and snapshot builder (C5, C6)
//! - `service` — the `UserService`/`DataKeeper` RPC façade (C7)
//! - `observability` — process-level metrics (C0d)

pub mod app_state;
pub mod auth;
pub mod config;
pub mod error;
pub mod hub;
pub mod observability;
pub mod service;
pub mod storage;

pub use app_state::AppState;
pub use config::AppConfig;
pub use error::ServerError;

use datakeeper_protos::datakeeper::v1::{data_keeper_server::DataKeeperServer, user_service_server::UserServiceServer};
use tonic::transport::Server;

use auth::AuthInterceptor;
use service::{DataKeeperImpl, UserServiceImpl};

/// Bind and serve the gRPC server, running until the given shutdown future
/// resolves. Mirrors `pkg/helpers/graceshut.go`: callers pass a future that
/// resolves on SIGHUP/SIGINT/SIGTERM/SIGQUIT.
pub async fn serve(
  config: AppConfig,
  shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
  let state = AppState::try_new(&config.server.db_url, &config.auth.secret).await?;

  let addr = config.server.addr.parse()?;
  let interceptor = AuthInterceptor::new(state.token_manager.clone());

  let user_service = UserServiceServer::new(UserServiceImpl::new(state.clone()));
  let data_keeper_service =
    DataKeeperServer::with_interceptor(DataKeeperImpl::new(state), interceptor);

  tracing::info!(%addr, "datakeeper_server listening");

  Server::builder()
    .add_service(user_service)
    .add_service(data_keeper_service)
    .serve_with_shutdown(addr, shutdown)
    .await?;

  Ok(())
}
