//! Newtype wrappers for every ID type in the system.
//!
//! These types provide type safety and prevent mixing up different kinds of IDs.

use serde::{Deserialize, Serialize};
use sqlx::Type;
use std::fmt;

macro_rules! id_type {
  ($name:ident) => {
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type,
    )]
    #[sqlx(transparent)]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
      }
    }

    impl From<i64> for $name {
      fn from(id: i64) -> Self {
        $name(id)
      }
    }

    impl From<$name> for i64 {
      fn from(id: $name) -> Self {
        id.0
      }
    }

    impl Default for $name {
      fn default() -> Self {
        $name(0)
      }
    }

    impl $name {
      pub fn new(id: i64) -> Self {
        $name(id)
      }

      pub fn inner(&self) -> i64 {
        self.0
      }
    }
  };
}

id_type!(UserId);
id_type!(PasswordPairId);
id_type!(TextId);
id_type!(CardId);
id_type!(BinId);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_id_creation() {
    let user_id = UserId::new(123);
    assert_eq!(user_id.inner(), 123);
    assert_eq!(user_id.0, 123);
  }

  #[test]
  fn test_id_conversion() {
    let user_id = UserId::from(456);
    let id_value: i64 = user_id.into();
    assert_eq!(id_value, 456);
  }

  #[test]
  fn test_id_display() {
    let card_id = CardId::new(789);
    assert_eq!(format!("{}", card_id), "789");
  }

  #[test]
  fn test_id_equality() {
    let id1 = TextId::new(100);
    let id2 = TextId::new(100);
    let id3 = TextId::new(200);

    assert_eq!(id1, id2);
    assert_ne!(id1, id3);
  }

  #[test]
  fn test_id_ordering() {
    let id1 = BinId::new(10);
    let id2 = BinId::new(20);

    assert!(id1 < id2);
    assert!(id2 > id1);
  }
}
