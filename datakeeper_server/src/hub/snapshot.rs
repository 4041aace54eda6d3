//! Snapshot builder (C5): a concurrent fan-out over the four record kinds,
//! grounded on `internal/server/grpc/services/datakeeper.go`'s
//! wait-for-all goroutine fan-in. `tokio::join!` runs the four listings
//! concurrently and unconditionally waits for all four, so one slow kind
//! never masks a failure in another and latency tracks the slowest kind
//! rather than their sum.

use datakeeper_core::{CoreError, RecordSource, Snapshot, UserId};

/// Aggregates failures from all four concurrent reads. Non-empty means the
/// hub must treat this refresh as a fatal broadcast condition.
#[derive(Debug, thiserror::Error)]
#[error("snapshot build failed: {0:?}")]
pub struct SnapshotError(pub Vec<CoreError>);

pub async fn build_snapshot(
  storage: &dyn RecordSource,
  owner_id: UserId,
) -> Result<Snapshot, SnapshotError> {
  let (password_pairs, texts, cards, bins) = tokio::join!(
    storage.list_password_pairs(owner_id),
    storage.list_texts(owner_id),
    storage.list_cards(owner_id),
    storage.list_bins(owner_id),
  );

  let mut errors = Vec::new();
  let password_pairs = password_pairs.map_err(|e| errors.push(e)).ok();
  let texts = texts.map_err(|e| errors.push(e)).ok();
  let cards = cards.map_err(|e| errors.push(e)).ok();
  let bins = bins.map_err(|e| errors.push(e)).ok();

  if !errors.is_empty() {
    return Err(SnapshotError(errors));
  }

  Ok(Snapshot {
    password_pairs: password_pairs.unwrap(),
    texts: texts.unwrap(),
    cards: cards.unwrap(),
    bins: bins.unwrap(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn snapshot_error_carries_all_failures() {
    let err = SnapshotError(vec![
      CoreError::Database("boom".into()),
      CoreError::Internal("also boom".into()),
    ]);
    assert_eq!(err.0.len(), 2);
  }
}
