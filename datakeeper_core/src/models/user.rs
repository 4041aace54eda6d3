use async_trait::async_trait;

use argon2::{
  Argon2, PasswordHash, PasswordVerifier,
  password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};

use crate::{error::CoreError, models::User};

/// Persistence seam for the credential store (C2). Implemented against
/// Postgres in `datakeeper_server::storage`; kept here as a trait so the
/// façade depends only on the domain contract, not on `sqlx`.
#[async_trait]
pub trait UserStore: Send + Sync {
  /// Fails with `CoreError::Conflict` if `login` is already taken.
  async fn create_user(&self, login: &str, password_hash: &str) -> Result<User, CoreError>;

  /// Distinguishes "not found" (`Ok(None)`) from a transient failure (`Err`).
  async fn get_user(&self, login: &str) -> Result<Option<User>, CoreError>;
}

/// Hash a plaintext password into an Argon2id PHC string.
pub fn hashed_password(password: &str) -> Result<String, CoreError> {
  let salt = SaltString::generate(OsRng);
  let argon2 = Argon2::default();

  let password_hash = argon2
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| CoreError::Internal(e.to_string()))?
    .to_string();

  Ok(password_hash)
}

/// Verify a plaintext password against a stored Argon2id PHC string.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, CoreError> {
  let argon2 = Argon2::default();
  let parsed_hash =
    PasswordHash::new(password_hash).map_err(|e| CoreError::Internal(e.to_string()))?;

  let is_valid = argon2
    .verify_password(password.as_bytes(), &parsed_hash)
    .is_ok();

  Ok(is_valid)
}

#[cfg(test)]
mod tests {
  use super::*;
  use anyhow::Result;

  #[test]
  fn hashed_password_should_work() -> Result<()> {
    let password = "hunter4332";
    let password_hash = hashed_password(password)?;
    assert_eq!(password_hash.len(), 97);
    let is_valid = verify_password(password, &password_hash)?;
    assert!(is_valid);
    Ok(())
  }

  #[test]
  fn verify_password_rejects_wrong_password() -> Result<()> {
    let password_hash = hashed_password("correct-horse")?;
    assert!(!verify_password("wrong-horse", &password_hash)?);
    Ok(())
  }
}
