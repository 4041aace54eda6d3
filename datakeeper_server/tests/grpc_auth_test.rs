//! Wire-level coverage for the auth gate (C4) and cross-session fan-out
//! (S4), driven over a real in-process `tonic` server, grounded on
//! `internal/server/grpc/interceptors/authn.go`'s behavior and the
//! integration-test style of standing up the real router and driving it
//! with a client.
//!
//! Requires a reachable Postgres at `DATAKEEPER_TEST_DATABASE_URL`; skips
//! (rather than failing) when that variable is unset, matching how
//! `sqlx`-backed integration suites are usually gated in CI.

use std::time::Duration;

use datakeeper_protos::datakeeper::v1::{
  CreatePasswordPairRequest, GetDataRequest, SignInRequest, SignUpRequest,
  data_keeper_client::DataKeeperClient, user_service_client::UserServiceClient,
};
use datakeeper_server::{AppConfig, config::{AuthConfig, ServerConfig}};
use tokio::net::TcpListener;
use tonic::Request;
use tonic::transport::Server as TransportServer;

async fn spawn_server() -> Option<String> {
  let db_url = std::env::var("DATAKEEPER_TEST_DATABASE_URL").ok()?;

  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  let config = AppConfig {
    server: ServerConfig {
      addr: addr.to_string(),
      db_url,
    },
    auth: AuthConfig {
      secret: "test-secret".to_string(),
    },
  };

  let incoming = tokio_stream::wrappers::TcpListenerStream::new(listener);
  tokio::spawn(async move {
    let state = datakeeper_server::AppState::try_new(&config.server.db_url, &config.auth.secret)
      .await
      .expect("connect to test database");

    let interceptor =
      datakeeper_server::auth::AuthInterceptor::new(state.token_manager.clone());
    let user_service = datakeeper_protos::datakeeper::v1::user_service_server::UserServiceServer::new(
      datakeeper_server::service::UserServiceImpl::new(state.clone()),
    );
    let data_keeper_service =
      datakeeper_protos::datakeeper::v1::data_keeper_server::DataKeeperServer::with_interceptor(
        datakeeper_server::service::DataKeeperImpl::new(state),
        interceptor,
      );

    TransportServer::builder()
      .add_service(user_service)
      .add_service(data_keeper_service)
      .serve_with_incoming(incoming)
      .await
      .unwrap();
  });

  // Give the listener task a moment to start accepting.
  tokio::time::sleep(Duration::from_millis(50)).await;
  Some(format!("http://{addr}"))
}

#[tokio::test]
async fn data_keeper_rpcs_reject_missing_and_invalid_tokens() {
  let Some(endpoint) = spawn_server().await else {
    eprintln!("skipping: DATAKEEPER_TEST_DATABASE_URL not set");
    return;
  };

  let mut client = DataKeeperClient::connect(endpoint).await.unwrap();

  let no_token = client
    .get_data(Request::new(GetDataRequest {}))
    .await
    .unwrap_err();
  assert_eq!(no_token.code(), tonic::Code::Unauthenticated);

  let mut bad_token_request = Request::new(GetDataRequest {});
  bad_token_request
    .metadata_mut()
    .insert("authorization", "Bearer garbage".parse().unwrap());
  let bad_token = client.get_data(bad_token_request).await.unwrap_err();
  assert_eq!(bad_token.code(), tonic::Code::Unauthenticated);
}

#[tokio::test]
async fn sign_up_and_sign_in_bypass_the_auth_gate() {
  let Some(endpoint) = spawn_server().await else {
    eprintln!("skipping: DATAKEEPER_TEST_DATABASE_URL not set");
    return;
  };

  let mut users = UserServiceClient::connect(endpoint).await.unwrap();

  let sign_up = users
    .sign_up(Request::new(SignUpRequest {
      login: "alice-wire-test".to_string(),
      password: "password".to_string(),
    }))
    .await
    .unwrap()
    .into_inner();
  assert!(sign_up.success);

  let sign_in = users
    .sign_in(Request::new(SignInRequest {
      login: "alice-wire-test".to_string(),
      password: "password".to_string(),
    }))
    .await
    .unwrap()
    .into_inner();
  assert!(!sign_in.token.is_empty());
}

#[tokio::test]
async fn second_session_mutation_fans_out_to_the_first_stream() {
  let Some(endpoint) = spawn_server().await else {
    eprintln!("skipping: DATAKEEPER_TEST_DATABASE_URL not set");
    return;
  };

  let mut users = UserServiceClient::connect(endpoint.clone()).await.unwrap();
  users
    .sign_up(Request::new(SignUpRequest {
      login: "bob-fanout-test".to_string(),
      password: "password".to_string(),
    }))
    .await
    .unwrap();
  let token = users
    .sign_in(Request::new(SignInRequest {
      login: "bob-fanout-test".to_string(),
      password: "password".to_string(),
    }))
    .await
    .unwrap()
    .into_inner()
    .token;

  let mut first = DataKeeperClient::connect(endpoint.clone()).await.unwrap();
  let mut first_request = Request::new(GetDataRequest {});
  first_request
    .metadata_mut()
    .insert("authorization", format!("Bearer {token}").parse().unwrap());
  let mut stream = first.get_data(first_request).await.unwrap().into_inner();

  let initial = stream.message().await.unwrap().unwrap();
  assert!(initial.password_pairs.is_empty());

  let mut second = DataKeeperClient::connect(endpoint).await.unwrap();
  let mut create_request = Request::new(CreatePasswordPairRequest {
    login: "l".to_string(),
    password: "p".to_string(),
    description: None,
  });
  create_request
    .metadata_mut()
    .insert("authorization", format!("Bearer {token}").parse().unwrap());
  second.create_password_pair(create_request).await.unwrap();

  let updated = tokio::time::timeout(Duration::from_secs(2), stream.message())
    .await
    .expect("fan-out should arrive before timeout")
    .unwrap()
    .unwrap();
  assert_eq!(updated.password_pairs.len(), 1);
  assert_eq!(updated.password_pairs[0].login, "l");
}
