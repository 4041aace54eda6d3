//! Sign-up/sign-in (C7, outside the auth gate). Grounded on
//! `internal/server/grpc/services/user.go` and spec section 4.7's second
//! paragraph.

use datakeeper_core::{CoreError, hashed_password, verify_password};
use datakeeper_protos::datakeeper::v1::{
  FieldError, SignInRequest, SignInResponse, SignUpRequest, SignUpResponse,
  user_service_server::UserService,
};
use tonic::{Request, Response, Status};

use crate::app_state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

pub struct UserServiceImpl {
  state: AppState,
}

impl UserServiceImpl {
  pub fn new(state: AppState) -> Self {
    Self { state }
  }
}

#[tonic::async_trait]
impl UserService for UserServiceImpl {
  async fn sign_up(
    &self,
    request: Request<SignUpRequest>,
  ) -> Result<Response<SignUpResponse>, Status> {
    let req = request.into_inner();

    if req.password.len() < MIN_PASSWORD_LEN {
      return Ok(Response::new(SignUpResponse {
        success: false,
        errors: vec![FieldError {
          name: "password".to_string(),
          error: "Password should be of length 8 or more".to_string(),
        }],
      }));
    }

    let password_hash = hashed_password(&req.password)
      .map_err(|e| Status::internal(format!("failed to hash password: {e}")))?;

    match self.state.storage.create_user(&req.login, &password_hash).await {
      Ok(_) => Ok(Response::new(SignUpResponse {
        success: true,
        errors: vec![],
      })),
      Err(CoreError::Conflict(_)) => Ok(Response::new(SignUpResponse {
        success: false,
        errors: vec![FieldError {
          name: "login".to_string(),
          error: "Login already exists".to_string(),
        }],
      })),
      Err(e) => {
        tracing::error!(error = %e, "sign up failed");
        Err(Status::internal("internal error"))
      }
    }
  }

  async fn sign_in(
    &self,
    request: Request<SignInRequest>,
  ) -> Result<Response<SignInResponse>, Status> {
    let req = request.into_inner();

    let wrong_credentials = || {
      Response::new(SignInResponse {
        token: String::new(),
        error: "wrong login or password".to_string(),
      })
    };

    let user = match self.state.storage.get_user(&req.login).await {
      Ok(Some(user)) => user,
      Ok(None) => return Ok(wrong_credentials()),
      Err(e) => {
        tracing::error!(error = %e, "sign in lookup failed");
        return Err(Status::internal("internal error"));
      }
    };

    let password_ok = verify_password(&req.password, &user.password_hash)
      .map_err(|e| Status::internal(format!("failed to verify password: {e}")))?;

    if !password_ok {
      return Ok(wrong_credentials());
    }

    let token = self
      .state
      .token_manager
      .mint(user.id)
      .map_err(|e| Status::internal(format!("failed to mint token: {e}")))?;

    Ok(Response::new(SignInResponse {
      token,
      error: String::new(),
    }))
  }
}
