use thiserror::Error;

/// Core domain error kinds, matching the four error kinds the spec defines
/// for the record store and credential store: a transient/unknown database
/// failure, a conflict (duplicate login), a caller-facing validation
/// failure, and an internal/unexpected failure.
#[derive(Error, Debug, Clone)]
pub enum CoreError {
  /// Backing store unavailable or returned an unmapped error. Retriable by
  /// the caller in principle; the façade maps this to `Internal`.
  #[error("database error: {0}")]
  Database(String),

  /// A uniqueness constraint was violated (e.g. login already taken).
  #[error("conflict: {0}")]
  Conflict(String),

  /// A caller-facing validation failure (e.g. password too short).
  #[error("validation error: {0}")]
  Validation(String),

  /// Token or credential verification failed.
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  /// Anything else unexpected.
  #[error("internal error: {0}")]
  Internal(String),
}

impl CoreError {
  /// Map a raw `sqlx::Error` to a `CoreError`, distinguishing unique
  /// constraint violations (→ `Conflict`) from everything else (→
  /// `Database`), the same triage `fechatter_core::error::CoreError::
  /// from_database_error` performs for its own constraint set.
  pub fn from_database_error(error: sqlx::Error) -> Self {
    if let Some(db_err) = error.as_database_error() {
      if db_err.is_unique_violation() {
        return CoreError::Conflict(db_err.message().to_string());
      }
    }
    CoreError::Database(error.to_string())
  }
}

impl From<sqlx::Error> for CoreError {
  fn from(err: sqlx::Error) -> Self {
    CoreError::from_database_error(err)
  }
}

impl From<jsonwebtoken::errors::Error> for CoreError {
  fn from(err: jsonwebtoken::errors::Error) -> Self {
    CoreError::Unauthorized(err.to_string())
  }
}

impl From<anyhow::Error> for CoreError {
  fn from(err: anyhow::Error) -> Self {
    CoreError::Internal(err.to_string())
  }
}

/// Implemented by each server-side error type that needs to translate a
/// `CoreError` into its own transport-facing representation (the tonic
/// analogue of `fechatter_core::error::ErrorMapper`).
pub trait ErrorMapper {
  type Error;

  fn map_error(error: CoreError) -> Self::Error;
}
