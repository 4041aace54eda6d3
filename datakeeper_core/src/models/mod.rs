pub mod ids;
pub mod record;
pub mod user;

pub use ids::{BinId, CardId, PasswordPairId, TextId, UserId};
pub use record::RecordSource;
pub use user::{UserStore, hashed_password, verify_password};

use serde::{Deserialize, Serialize};

/// A registered account. `password_hash` is always an Argon2id PHC string,
/// never a plaintext password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id: UserId,
  pub login: String,
  pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPair {
  pub id: PasswordPairId,
  pub owner_id: UserId,
  pub login: String,
  pub password: String,
  pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
  pub id: TextId,
  pub owner_id: UserId,
  pub name: String,
  pub body: String,
  pub description: Option<String>,
}

/// Expiry month (1-12), expiry year (0-99), and CVV (<= 999) are stored as
/// given; no Luhn or issuer validation is performed (spec Non-goal).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
  pub id: CardId,
  pub owner_id: UserId,
  pub name: String,
  pub number: String,
  pub valid_through_month: i16,
  pub valid_through_year: i16,
  pub cvv: i16,
  pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bin {
  pub id: BinId,
  pub owner_id: UserId,
  pub name: String,
  pub data: Vec<u8>,
  pub description: Option<String>,
}

/// The full per-user state emitted on every `GetData` tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
  pub password_pairs: Vec<PasswordPair>,
  pub texts: Vec<Text>,
  pub cards: Vec<Card>,
  pub bins: Vec<Bin>,
}
