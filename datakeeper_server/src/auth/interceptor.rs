//! Auth gate (C4), applied uniformly to every `DataKeeper` RPC and never to
//! `UserService`. Grounded on `internal/server/grpc/interceptors/authn.go`:
//! extract the `Authorization` header, require exactly one `Bearer <token>`
//! value, verify via the token service, and attach the user id to the call
//! context. `tonic::service::Interceptor` already operates on the request
//! before the body is demultiplexed, so the same interceptor covers both
//! unary and server-streaming RPCs — the Rust analogue of the Go
//! implementation's `serverStreamWrapper` context rewrite.

use datakeeper_core::{TokenManager, UserId};
use tonic::{Request, Status, service::Interceptor};

#[derive(Clone)]
pub struct AuthInterceptor {
  token_manager: TokenManager,
}

impl AuthInterceptor {
  pub fn new(token_manager: TokenManager) -> Self {
    Self { token_manager }
  }
}

impl Interceptor for AuthInterceptor {
  fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
    let header = request
      .metadata()
      .get("authorization")
      .ok_or_else(|| Status::unauthenticated("missing authorization metadata"))?
      .to_str()
      .map_err(|_| Status::unauthenticated("invalid authorization metadata"))?;

    let token = header
      .strip_prefix("Bearer ")
      .ok_or_else(|| Status::unauthenticated("expected a Bearer token"))?;

    let user_id = self
      .token_manager
      .verify(token)
      .map_err(|_| Status::unauthenticated("invalid token"))?;

    request.extensions_mut().insert(user_id);
    Ok(request)
  }
}

/// Pull the user id the interceptor attached. Panics only if called on an
/// RPC not behind `AuthInterceptor`, which would be a wiring bug.
pub fn authenticated_user<T>(request: &Request<T>) -> Result<UserId, Status> {
  request
    .extensions()
    .get::<UserId>()
    .copied()
    .ok_or_else(|| Status::unauthenticated("missing authenticated user id"))
}
