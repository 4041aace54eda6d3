//! Subscription hub (C6) — the system's central component.
//!
//! Grounded on spec section 4.6 and loosely inspired by
//! `notify_server::connections::manager::ConnectionManager`'s user→sender
//! map, but replacing its `broadcast` channel with the spec's capacity-1
//! coalescing notify signal and a per-owner refresh loop that rebuilds a
//! full snapshot (C5) rather than forwarding individual events.

pub mod snapshot;

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use std::sync::Arc;

use datakeeper_core::{RecordSource, Snapshot, UserId};
use tokio::sync::{Notify, RwLock, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::warn;
use uuid::Uuid;

use crate::error::ServerError;
use snapshot::build_snapshot;

pub type SubscriptionId = Uuid;

/// A capacity-1, non-blocking, coalescing wakeup. `signal` collapses any
/// number of concurrent callers into at most one pending wakeup, matching
/// invariant 6 (coalesce, never block, never queue).
struct NotifySignal {
  pending: AtomicBool,
  notify: Notify,
}

impl NotifySignal {
  fn new() -> Self {
    Self {
      pending: AtomicBool::new(false),
      notify: Notify::new(),
    }
  }

  /// Non-blocking send: drop the signal if one is already pending.
  fn signal(&self) {
    if self
      .pending
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed)
      .is_ok()
    {
      self.notify.notify_one();
    }
  }

  async fn wait(&self) {
    // Clear before awaiting: a `signal()` that lands while we're parked in
    // `notified()` must still see `pending == false` so its `compare_exchange`
    // succeeds and wakes us, instead of being silently dropped.
    self.pending.store(false, Ordering::Release);
    self.notify.notified().await;
  }
}

struct SubscriberEntry {
  tx: mpsc::Sender<Snapshot>,
  error_tx: Option<oneshot::Sender<ServerError>>,
}

struct UserHub {
  cached_snapshot: Mutex<Snapshot>,
  subscribers: Mutex<HashMap<SubscriptionId, SubscriberEntry>>,
  notify_signal: NotifySignal,
  refresh_handle: JoinHandle<()>,
}

impl UserHub {
  fn subscriber_count(&self) -> usize {
    self.subscribers.lock().unwrap().len()
  }
}

impl Drop for UserHub {
  fn drop(&mut self) {
    self.refresh_handle.abort();
  }
}

struct HubInner {
  storage: Arc<dyn RecordSource>,
  registry: RwLock<HashMap<UserId, Arc<UserHub>>>,
}

/// Per-user fan-out subscription hub. One instance is shared for the whole
/// process; `UserHub`s are created lazily on first subscribe and torn down
/// on last unsubscribe.
#[derive(Clone)]
pub struct SubscriptionHub {
  inner: Arc<HubInner>,
}

impl SubscriptionHub {
  pub fn new(storage: Arc<dyn RecordSource>) -> Self {
    Self {
      inner: Arc::new(HubInner {
        storage,
        registry: RwLock::new(HashMap::new()),
      }),
    }
  }

  /// Subscribe returns the push sender's subscription id, plus a receiver
  /// that fires once if a later refresh fails fatally.
  pub async fn subscribe(
    &self,
    owner_id: UserId,
    tx: mpsc::Sender<Snapshot>,
  ) -> Result<(SubscriptionId, oneshot::Receiver<ServerError>), ServerError> {
    let mut registry = self.inner.registry.write().await;

    let mut just_created = false;
    if !registry.contains_key(&owner_id) {
      let snapshot = build_snapshot(self.inner.storage.as_ref(), owner_id)
        .await
        .map_err(|e| ServerError::Internal(format!("{e}")))?;

      let hub = self.spawn_user_hub(owner_id, snapshot);
      registry.insert(owner_id, hub);
      just_created = true;
      crate::observability::metrics::collectors::HubMetrics::active_hubs(registry.len());
    }

    let hub = registry.get(&owner_id).expect("just inserted").clone();

    let subscription_id = Uuid::new_v4();
    let initial_snapshot = hub.cached_snapshot.lock().unwrap().clone();

    if tx.send(initial_snapshot).await.is_err() {
      // The hub we just spawned has zero subscribers and would otherwise
      // sit in `registry` forever with its refresh loop parked on
      // `notify_signal.wait()`. Tear it down immediately; `UserHub::drop`
      // aborts the refresh task. A pre-existing hub is left alone — other
      // subscribers (if any) still depend on it.
      if just_created {
        registry.remove(&owner_id);
        crate::observability::metrics::collectors::HubMetrics::active_hubs(registry.len());
      }
      return Err(ServerError::Internal(
        "subscriber stream closed immediately".into(),
      ));
    }

    let (error_tx, error_rx) = oneshot::channel();
    hub.subscribers.lock().unwrap().insert(
      subscription_id,
      SubscriberEntry {
        tx,
        error_tx: Some(error_tx),
      },
    );

    Ok((subscription_id, error_rx))
  }

  pub async fn unsubscribe(&self, owner_id: UserId, subscription_id: SubscriptionId) {
    let mut registry = self.inner.registry.write().await;

    let Some(hub) = registry.get(&owner_id) else {
      return;
    };

    hub.subscribers.lock().unwrap().remove(&subscription_id);

    if hub.subscriber_count() == 0 {
      registry.remove(&owner_id);
      crate::observability::metrics::collectors::HubMetrics::active_hubs(registry.len());
    }
  }

  /// Non-blocking, best-effort wakeup of the owner's refresh loop.
  pub async fn notify(&self, owner_id: UserId) {
    let registry = self.inner.registry.read().await;
    if let Some(hub) = registry.get(&owner_id) {
      hub.notify_signal.signal();
    }
  }

  fn spawn_user_hub(&self, owner_id: UserId, initial: Snapshot) -> Arc<UserHub> {
    let notify_signal = NotifySignal::new();
    let cached_snapshot = Mutex::new(initial);
    let subscribers = Mutex::new(HashMap::new());

    Arc::new_cyclic(|weak: &std::sync::Weak<UserHub>| {
      let inner = self.inner.clone();
      let weak = weak.clone();

      let refresh_handle = tokio::spawn(async move {
        loop {
          {
            let Some(hub) = weak.upgrade() else {
              return;
            };
            hub.notify_signal.wait().await;
          }

          // Hold the registry reader lock for the duration of the refresh
          // body, serializing it against Subscribe/Unsubscribe's writer lock.
          let registry = inner.registry.read().await;
          let Some(hub) = weak.upgrade() else {
            return;
          };

          match build_snapshot(inner.storage.as_ref(), owner_id).await {
            Ok(snapshot) => {
              crate::observability::metrics::collectors::HubMetrics::refresh_succeeded();
              *hub.cached_snapshot.lock().unwrap() = snapshot.clone();
              let subscribers = hub.subscribers.lock().unwrap();
              for entry in subscribers.values() {
                // Per-push errors are ignored: a dead subscriber will
                // surface end-of-stream on its own and unsubscribe.
                let _ = entry.tx.try_send(snapshot.clone());
              }
            }
            Err(e) => {
              crate::observability::metrics::collectors::HubMetrics::refresh_failed();
              warn!(owner = owner_id.inner(), error = ?e.0, "snapshot refresh failed, tearing down hub");
              let mut subscribers = hub.subscribers.lock().unwrap();
              for (_, entry) in subscribers.iter_mut() {
                if let Some(error_tx) = entry.error_tx.take() {
                  let _ = error_tx.send(ServerError::Internal(
                    "snapshot refresh failed".to_string(),
                  ));
                }
              }
              drop(subscribers);
              drop(registry);
              return;
            }
          }

          drop(registry);
        }
      });

      UserHub {
        cached_snapshot,
        subscribers,
        notify_signal,
        refresh_handle,
      }
    })
  }

  #[cfg(test)]
  pub async fn active_hub_count(&self) -> usize {
    self.inner.registry.read().await.len()
  }
}

impl std::fmt::Debug for SubscriptionHub {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SubscriptionHub").finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use async_trait::async_trait;
  use datakeeper_core::{Bin, Card, CoreError, PasswordPair, PasswordPairId, Text};
  use tokio::sync::mpsc;

  use super::*;

  /// In-memory stand-in for `PgStorage`, grounded on the trait seam
  /// `RecordSource` exists for: exercising hub invariants without a
  /// database. Mutating `password_pairs` directly then calling
  /// `SubscriptionHub::notify` simulates what a real mutation RPC does
  /// (write, then wake the owner's refresh loop).
  #[derive(Default)]
  struct FakeRecordSource {
    password_pairs: Mutex<Vec<PasswordPair>>,
  }

  impl FakeRecordSource {
    fn push_password_pair(&self, login: &str) {
      let id = {
        let guard = self.password_pairs.lock().unwrap();
        guard.len() as i64 + 1
      };
      self.password_pairs.lock().unwrap().push(PasswordPair {
        id: PasswordPairId::new(id),
        owner_id: UserId::new(1),
        login: login.to_string(),
        password: "p".to_string(),
        description: None,
      });
    }
  }

  #[async_trait]
  impl RecordSource for FakeRecordSource {
    async fn list_password_pairs(&self, _owner_id: UserId) -> Result<Vec<PasswordPair>, CoreError> {
      Ok(self.password_pairs.lock().unwrap().clone())
    }

    async fn list_texts(&self, _owner_id: UserId) -> Result<Vec<Text>, CoreError> {
      Ok(Vec::new())
    }

    async fn list_cards(&self, _owner_id: UserId) -> Result<Vec<Card>, CoreError> {
      Ok(Vec::new())
    }

    async fn list_bins(&self, _owner_id: UserId) -> Result<Vec<Bin>, CoreError> {
      Ok(Vec::new())
    }
  }

  fn hub_with_fake() -> (SubscriptionHub, std::sync::Arc<FakeRecordSource>) {
    let fake = std::sync::Arc::new(FakeRecordSource::default());
    let hub = SubscriptionHub::new(fake.clone() as std::sync::Arc<dyn RecordSource>);
    (hub, fake)
  }

  #[tokio::test]
  async fn subscribe_emits_empty_initial_snapshot() {
    let (hub, _fake) = hub_with_fake();
    let owner = UserId::new(1);
    let (tx, mut rx) = mpsc::channel(4);

    hub.subscribe(owner, tx).await.unwrap();

    let snapshot = rx.recv().await.unwrap();
    assert!(snapshot.password_pairs.is_empty());
    assert!(snapshot.texts.is_empty());
    assert!(snapshot.cards.is_empty());
    assert!(snapshot.bins.is_empty());
  }

  #[tokio::test]
  async fn notify_pushes_a_refreshed_snapshot_with_the_mutation() {
    let (hub, fake) = hub_with_fake();
    let owner = UserId::new(1);
    let (tx, mut rx) = mpsc::channel(4);

    hub.subscribe(owner, tx).await.unwrap();
    let _initial = rx.recv().await.unwrap();

    fake.push_password_pair("l");
    hub.notify(owner).await;

    let snapshot = tokio::time::timeout(Duration::from_secs(1), rx.recv())
      .await
      .expect("refresh should deliver before timeout")
      .unwrap();

    assert_eq!(snapshot.password_pairs.len(), 1);
    assert_eq!(snapshot.password_pairs[0].login, "l");
  }

  #[tokio::test]
  async fn concurrent_notifies_coalesce_into_a_converging_snapshot() {
    let (hub, fake) = hub_with_fake();
    let owner = UserId::new(1);
    let (tx, mut rx) = mpsc::channel(128);

    hub.subscribe(owner, tx).await.unwrap();
    let _initial = rx.recv().await.unwrap();

    for i in 0..100 {
      fake.push_password_pair(&format!("l{i}"));
      hub.notify(owner).await;
    }

    // Coalescing means the refresh loop may not run once per notify; poll
    // until the cached state has caught up with all 100 mutations.
    let mut last = rx.recv().await.unwrap();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while last.password_pairs.len() < 100 && tokio::time::Instant::now() < deadline {
      if let Ok(Some(next)) = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await {
        last = next;
      } else {
        break;
      }
    }

    assert_eq!(last.password_pairs.len(), 100);
  }

  #[tokio::test]
  async fn unsubscribing_all_subscribers_tears_down_the_hub() {
    let (hub, _fake) = hub_with_fake();
    let owner = UserId::new(1);

    let mut subscription_ids = Vec::new();
    for _ in 0..10 {
      let (tx, mut rx) = mpsc::channel(4);
      let (subscription_id, _error_rx) = hub.subscribe(owner, tx).await.unwrap();
      let _initial = rx.recv().await.unwrap();
      subscription_ids.push(subscription_id);
      // keep rx alive implicitly by leaking it into the loop body's drop
      // at end of each iteration is fine: unsubscribe doesn't require the
      // receiver to stay open.
    }

    assert_eq!(hub.active_hub_count().await, 1);

    for subscription_id in subscription_ids {
      hub.unsubscribe(owner, subscription_id).await;
    }

    assert_eq!(hub.active_hub_count().await, 0);
  }
}
