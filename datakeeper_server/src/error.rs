use datakeeper_core::{CoreError, ErrorMapper};
use thiserror::Error;

/// Server-facing error type. No backing-store error text crosses the RPC
/// boundary — `tonic::Status` messages are a fixed set of generic strings;
/// full detail is logged with `tracing::error!` before conversion.
#[derive(Error, Debug)]
pub enum ServerError {
  #[error("database error: {0}")]
  Database(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("validation error: {0}")]
  Validation(String),

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("internal error: {0}")]
  Internal(String),

  #[error("missing authorization metadata")]
  MissingToken,
}

impl ErrorMapper for ServerError {
  type Error = ServerError;

  fn map_error(error: CoreError) -> Self::Error {
    match error {
      CoreError::Database(e) => ServerError::Database(e),
      CoreError::Conflict(msg) => ServerError::Conflict(msg),
      CoreError::Validation(msg) => ServerError::Validation(msg),
      CoreError::Unauthorized(msg) => ServerError::Unauthorized(msg),
      CoreError::Internal(msg) => ServerError::Internal(msg),
    }
  }
}

impl From<CoreError> for ServerError {
  fn from(error: CoreError) -> Self {
    tracing::error!(%error, "core error");
    ServerError::map_error(error)
  }
}

impl From<ServerError> for tonic::Status {
  fn from(error: ServerError) -> Self {
    match error {
      ServerError::Database(_) | ServerError::Internal(_) => {
        tracing::error!(%error, "internal failure");
        tonic::Status::internal("internal error")
      }
      ServerError::Conflict(msg) => tonic::Status::already_exists(msg),
      ServerError::Validation(msg) => tonic::Status::invalid_argument(msg),
      ServerError::Unauthorized(_) | ServerError::MissingToken => {
        tonic::Status::unauthenticated("invalid or missing token")
      }
    }
  }
}
