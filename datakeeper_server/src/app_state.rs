use std::sync::Arc;

use datakeeper_core::{RecordSource, TokenManager};

use crate::hub::SubscriptionHub;
use crate::storage::PgStorage;

/// Shared state the RPC façade (C7) is built from: storage, the
/// subscription hub, and the token service. Grounded on
/// `notify_server::state::AppState`'s cheap-clone `Arc`-backed shape,
/// trimmed to the parts this system actually needs.
#[derive(Clone)]
pub struct AppState {
  pub storage: PgStorage,
  pub hub: SubscriptionHub,
  pub token_manager: TokenManager,
}

impl AppState {
  pub async fn try_new(db_url: &str, auth_secret: &str) -> anyhow::Result<Self> {
    let storage = PgStorage::connect(db_url).await?;
    storage.migrate().await?;

    let hub = SubscriptionHub::new(Arc::new(storage.clone()) as Arc<dyn RecordSource>);
    let token_manager = TokenManager::new(auth_secret.as_bytes());

    Ok(Self {
      storage,
      hub,
      token_manager,
    })
  }
}
