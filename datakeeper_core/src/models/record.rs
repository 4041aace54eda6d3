use async_trait::async_trait;

use crate::{
  error::CoreError,
  models::{Bin, Card, PasswordPair, Text, UserId},
};

/// Read seam the snapshot builder (C5) and subscription hub (C6) depend on,
/// separate from the mutation side of the record store so that hub tests
/// can substitute an in-memory fake without standing up Postgres.
#[async_trait]
pub trait RecordSource: Send + Sync {
  async fn list_password_pairs(&self, owner_id: UserId) -> Result<Vec<PasswordPair>, CoreError>;
  async fn list_texts(&self, owner_id: UserId) -> Result<Vec<Text>, CoreError>;
  async fn list_cards(&self, owner_id: UserId) -> Result<Vec<Card>, CoreError>;
  async fn list_bins(&self, owner_id: UserId) -> Result<Vec<Bin>, CoreError>;
}
