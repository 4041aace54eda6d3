pub mod metrics;

use crate::error::ServerError;

pub async fn init_observability() -> Result<(), ServerError> {
  metrics::init_metrics().await?;
  tracing::info!("observability initialized for datakeeper_server");
  Ok(())
}
