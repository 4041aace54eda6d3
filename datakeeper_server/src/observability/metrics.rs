use crate::error::ServerError;
use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

/// Prometheus endpoint, separate from the gRPC port.
const METRICS_ADDR: &str = "0.0.0.0:9091";

pub async fn init_metrics() -> Result<(), ServerError> {
  let builder = PrometheusBuilder::new();

  register_datakeeper_metrics();

  builder
    .with_http_listener(
      METRICS_ADDR
        .parse::<std::net::SocketAddr>()
        .map_err(|e| ServerError::Internal(format!("invalid metrics bind address: {e}")))?,
    )
    .install()
    .map_err(|e| ServerError::Internal(format!("failed to install Prometheus exporter: {e}")))?;

  info!("metrics server listening on {}", METRICS_ADDR);
  Ok(())
}

fn register_datakeeper_metrics() {
  gauge!("datakeeper_active_hubs").set(0.0);
  gauge!("datakeeper_active_subscriptions").set(0.0);
  counter!("datakeeper_snapshot_refresh_total", "status" => "success").absolute(0);
  counter!("datakeeper_snapshot_refresh_total", "status" => "failure").absolute(0);
  counter!("datakeeper_rpc_requests_total", "rpc" => "get_data").absolute(0);
}

/// Process-level gauges the hub updates as users subscribe/unsubscribe.
pub mod collectors {
  use metrics::{counter, gauge};

  pub struct HubMetrics;

  impl HubMetrics {
    pub fn active_hubs(count: usize) {
      gauge!("datakeeper_active_hubs").set(count as f64);
    }

    pub fn active_subscriptions(count: usize) {
      gauge!("datakeeper_active_subscriptions").set(count as f64);
    }

    pub fn refresh_succeeded() {
      counter!("datakeeper_snapshot_refresh_total", "status" => "success").increment(1);
    }

    pub fn refresh_failed() {
      counter!("datakeeper_snapshot_refresh_total", "status" => "failure").increment(1);
    }
  }
}
