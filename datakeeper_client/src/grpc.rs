//! Thin wrapper around the generated `UserService`/`DataKeeper` clients,
//! grounded on `internal/client/client.go`'s single-connection `Application`
//! shape: one channel, two stub clients, a held bearer token.

use anyhow::{Context, Result};
use datakeeper_protos::datakeeper::v1::{
  Bin, Card, CreateBinRequest, CreateCardRequest, CreatePasswordPairRequest, CreateTextRequest,
  GetDataRequest, PasswordPair, RemoveBinRequest, RemoveCardRequest, RemovePasswordPairRequest,
  RemoveTextRequest, SignInRequest, SignUpRequest, Snapshot, Text,
  data_keeper_client::DataKeeperClient, user_service_client::UserServiceClient,
};
use tokio::sync::mpsc;
use tonic::Request;
use tonic::transport::Channel;

#[derive(Clone)]
pub struct GrpcClient {
  user: UserServiceClient<Channel>,
  data: DataKeeperClient<Channel>,
  token: Option<String>,
}

impl GrpcClient {
  pub async fn connect(addr: &str) -> Result<Self> {
    let endpoint = format!("http://{addr}");
    let channel = Channel::from_shared(endpoint)
      .context("invalid server address")?
      .connect()
      .await
      .context("failed to connect to datakeeper server")?;

    Ok(Self {
      user: UserServiceClient::new(channel.clone()),
      data: DataKeeperClient::new(channel),
      token: None,
    })
  }

  pub fn is_authenticated(&self) -> bool {
    self.token.is_some()
  }

  pub async fn sign_up(&mut self, login: String, password: String) -> Result<Option<String>> {
    let response = self
      .user
      .sign_up(Request::new(SignUpRequest { login, password }))
      .await?
      .into_inner();

    if response.success {
      return Ok(None);
    }

    Ok(response.errors.into_iter().next().map(|e| e.error))
  }

  pub async fn sign_in(&mut self, login: String, password: String) -> Result<Option<String>> {
    let response = self
      .user
      .sign_in(Request::new(SignInRequest { login, password }))
      .await?
      .into_inner();

    if !response.error.is_empty() {
      return Ok(Some(response.error));
    }

    self.token = Some(response.token);
    Ok(None)
  }

  fn authorized_request<T>(&self, message: T) -> Result<Request<T>> {
    let token = self.token.as_deref().context("not signed in")?;
    let mut request = Request::new(message);
    request
      .metadata_mut()
      .insert("authorization", format!("Bearer {token}").parse()?);
    Ok(request)
  }

  /// Spawns the long-lived `GetData` stream and forwards each snapshot onto
  /// the returned channel, mirroring `DataPage.startFetchingData`'s
  /// background goroutine.
  pub fn spawn_snapshot_stream(&self) -> Result<mpsc::Receiver<Snapshot>> {
    let token = self.token.clone().context("not signed in")?;
    let mut data = self.data.clone();
    let (tx, rx) = mpsc::channel(8);

    tokio::spawn(async move {
      let mut request = Request::new(GetDataRequest {});
      let Ok(value) = format!("Bearer {token}").parse() else {
        return;
      };
      request.metadata_mut().insert("authorization", value);

      let mut stream = match data.get_data(request).await {
        Ok(response) => response.into_inner(),
        Err(e) => {
          tracing::error!(error = %e, "get_data stream failed to start");
          return;
        }
      };

      loop {
        match tokio_stream::StreamExt::next(&mut stream).await {
          Some(Ok(snapshot)) => {
            if tx.send(snapshot).await.is_err() {
              return;
            }
          }
          Some(Err(e)) => {
            tracing::warn!(error = %e, "get_data stream error");
            return;
          }
          None => return,
        }
      }
    });

    Ok(rx)
  }

  pub async fn create_password_pair(
    &self,
    login: String,
    password: String,
    description: Option<String>,
  ) -> Result<()> {
    let request = self.authorized_request(CreatePasswordPairRequest {
      login,
      password,
      description,
    })?;
    self.data.clone().create_password_pair(request).await?;
    Ok(())
  }

  pub async fn remove_password_pair(&self, id: i64) -> Result<()> {
    let request = self.authorized_request(RemovePasswordPairRequest { id })?;
    self.data.clone().remove_password_pair(request).await?;
    Ok(())
  }

  pub async fn create_text(
    &self,
    name: String,
    text: String,
    description: Option<String>,
  ) -> Result<()> {
    let request = self.authorized_request(CreateTextRequest {
      name,
      text,
      description,
    })?;
    self.data.clone().create_text(request).await?;
    Ok(())
  }

  pub async fn remove_text(&self, id: i64) -> Result<()> {
    let request = self.authorized_request(RemoveTextRequest { id })?;
    self.data.clone().remove_text(request).await?;
    Ok(())
  }

  #[allow(clippy::too_many_arguments)]
  pub async fn create_card(
    &self,
    name: String,
    number: String,
    valid_through_month: i32,
    valid_through_year: i32,
    cvv: i32,
    description: Option<String>,
  ) -> Result<()> {
    let request = self.authorized_request(CreateCardRequest {
      name,
      number,
      valid_through_month,
      valid_through_year,
      cvv,
      description,
    })?;
    self.data.clone().create_card(request).await?;
    Ok(())
  }

  pub async fn remove_card(&self, id: i64) -> Result<()> {
    let request = self.authorized_request(RemoveCardRequest { id })?;
    self.data.clone().remove_card(request).await?;
    Ok(())
  }

  pub async fn create_bin(
    &self,
    name: String,
    data: Vec<u8>,
    description: Option<String>,
  ) -> Result<()> {
    let request = self.authorized_request(CreateBinRequest {
      name,
      data,
      description,
    })?;
    self.data.clone().create_bin(request).await?;
    Ok(())
  }

  pub async fn remove_bin(&self, id: i64) -> Result<()> {
    let request = self.authorized_request(RemoveBinRequest { id })?;
    self.data.clone().remove_bin(request).await?;
    Ok(())
  }
}

pub fn password_pair_summary(pair: &PasswordPair) -> String {
  pair.login.clone()
}

pub fn text_summary(text: &Text) -> String {
  text.name.clone()
}

pub fn card_summary(card: &Card) -> String {
  card.name.clone()
}

pub fn bin_summary(bin: &Bin) -> String {
  bin.name.clone()
}
