pub mod error;
pub mod jwt;
pub mod models;

pub use error::{CoreError, ErrorMapper};
pub use jwt::TokenManager;
pub use models::{
  Bin, BinId, Card, CardId, PasswordPair, PasswordPairId, RecordSource, Snapshot, Text, TextId,
  User, UserId, UserStore, hashed_password, verify_password,
};
