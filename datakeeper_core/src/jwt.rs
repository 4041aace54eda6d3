//! Token service (C3): mints and verifies the bearer tokens the auth gate
//! (C4) checks on every `DataKeeper` RPC.
//!
//! Grounded on `fechatter_core::utils::jwt::TokenManager`, trimmed to a
//! single symmetric-key algorithm and a single numeric claim — this system
//! has no refresh tokens and no per-user claim payload beyond the subject id.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{error::CoreError, models::UserId};

/// `sub` is kept as a bare `i64`, not a string, so that a claim which
/// serde_json parsed as a non-integral `f64` is rejected by deserialization
/// itself rather than by a secondary integrality check — mirroring the
/// original implementation's float64-claim bug by construction instead of
/// reproducing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
  sub: i64,
}

#[derive(Clone)]
pub struct TokenManager {
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
}

impl TokenManager {
  pub fn new(secret: &[u8]) -> Self {
    Self {
      encoding_key: EncodingKey::from_secret(secret),
      decoding_key: DecodingKey::from_secret(secret),
    }
  }

  pub fn mint(&self, user_id: UserId) -> Result<String, CoreError> {
    let claims = Claims {
      sub: user_id.inner(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
      .map_err(|e| CoreError::Unauthorized(e.to_string()))
  }

  pub fn verify(&self, token: &str) -> Result<UserId, CoreError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;

    let data = decode::<Claims>(token, &self.decoding_key, &validation)
      .map_err(|e| CoreError::Unauthorized(e.to_string()))?;

    Ok(UserId::new(data.claims.sub))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mint_then_verify_round_trips() {
    let manager = TokenManager::new(b"test-secret");
    let token = manager.mint(UserId::new(42)).unwrap();
    let user_id = manager.verify(&token).unwrap();
    assert_eq!(user_id, UserId::new(42));
  }

  #[test]
  fn verify_rejects_garbage_token() {
    let manager = TokenManager::new(b"test-secret");
    assert!(manager.verify("not-a-token").is_err());
  }

  #[test]
  fn verify_rejects_token_signed_with_a_different_secret() {
    let signer = TokenManager::new(b"secret-a");
    let verifier = TokenManager::new(b"secret-b");
    let token = signer.mint(UserId::new(7)).unwrap();
    assert!(verifier.verify(&token).is_err());
  }
}
