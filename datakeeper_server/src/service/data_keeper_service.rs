//! The `DataKeeper` RPC façade (C7): eight mutation RPCs plus the `GetData`
//! streaming read. Grounded on `internal/server/grpc/services/
//! datakeeper.go`'s uniform mutation shape (read owner from context, call
//! the store, notify the hub, return empty) and its streaming handler that
//! blocks until the stream ends or an error fires.

use std::pin::Pin;

use datakeeper_core::{CoreError, Snapshot};
use datakeeper_protos::datakeeper::v1::{
  self as proto, Empty, data_keeper_server::DataKeeper,
};
use tokio::sync::mpsc;
use tokio_stream::{Stream, wrappers::ReceiverStream};
use tonic::{Request, Response, Status};

use crate::app_state::AppState;
use crate::auth::authenticated_user;
use crate::error::ServerError;

pub struct DataKeeperImpl {
  state: AppState,
}

impl DataKeeperImpl {
  pub fn new(state: AppState) -> Self {
    Self { state }
  }
}

fn map_mutation_error(error: CoreError) -> Status {
  ServerError::from(error).into()
}

#[tonic::async_trait]
impl DataKeeper for DataKeeperImpl {
  async fn create_password_pair(
    &self,
    request: Request<proto::CreatePasswordPairRequest>,
  ) -> Result<Response<Empty>, Status> {
    let owner_id = authenticated_user(&request)?;
    let req = request.into_inner();

    self
      .state
      .storage
      .create_password_pair(owner_id, &req.login, &req.password, req.description.as_deref())
      .await
      .map_err(map_mutation_error)?;

    self.state.hub.notify(owner_id).await;
    Ok(Response::new(Empty {}))
  }

  async fn remove_password_pair(
    &self,
    request: Request<proto::RemovePasswordPairRequest>,
  ) -> Result<Response<Empty>, Status> {
    let owner_id = authenticated_user(&request)?;
    let req = request.into_inner();

    self
      .state
      .storage
      .remove_password_pair(owner_id, req.id.into())
      .await
      .map_err(map_mutation_error)?;

    self.state.hub.notify(owner_id).await;
    Ok(Response::new(Empty {}))
  }

  async fn create_text(
    &self,
    request: Request<proto::CreateTextRequest>,
  ) -> Result<Response<Empty>, Status> {
    let owner_id = authenticated_user(&request)?;
    let req = request.into_inner();

    self
      .state
      .storage
      .create_text(owner_id, &req.name, &req.text, req.description.as_deref())
      .await
      .map_err(map_mutation_error)?;

    self.state.hub.notify(owner_id).await;
    Ok(Response::new(Empty {}))
  }

  async fn remove_text(
    &self,
    request: Request<proto::RemoveTextRequest>,
  ) -> Result<Response<Empty>, Status> {
    let owner_id = authenticated_user(&request)?;
    let req = request.into_inner();

    self
      .state
      .storage
      .remove_text(owner_id, req.id.into())
      .await
      .map_err(map_mutation_error)?;

    self.state.hub.notify(owner_id).await;
    Ok(Response::new(Empty {}))
  }

  async fn create_card(
    &self,
    request: Request<proto::CreateCardRequest>,
  ) -> Result<Response<Empty>, Status> {
    let owner_id = authenticated_user(&request)?;
    let req = request.into_inner();

    self
      .state
      .storage
      .create_card(
        owner_id,
        &req.name,
        &req.number,
        req.valid_through_month as i16,
        req.valid_through_year as i16,
        req.cvv as i16,
        req.description.as_deref(),
      )
      .await
      .map_err(map_mutation_error)?;

    self.state.hub.notify(owner_id).await;
    Ok(Response::new(Empty {}))
  }

  async fn remove_card(
    &self,
    request: Request<proto::RemoveCardRequest>,
  ) -> Result<Response<Empty>, Status> {
    let owner_id = authenticated_user(&request)?;
    let req = request.into_inner();

    self
      .state
      .storage
      .remove_card(owner_id, req.id.into())
      .await
      .map_err(map_mutation_error)?;

    self.state.hub.notify(owner_id).await;
    Ok(Response::new(Empty {}))
  }

  async fn create_bin(
    &self,
    request: Request<proto::CreateBinRequest>,
  ) -> Result<Response<Empty>, Status> {
    let owner_id = authenticated_user(&request)?;
    let req = request.into_inner();

    self
      .state
      .storage
      .create_bin(owner_id, &req.name, &req.data, req.description.as_deref())
      .await
      .map_err(map_mutation_error)?;

    self.state.hub.notify(owner_id).await;
    Ok(Response::new(Empty {}))
  }

  async fn remove_bin(
    &self,
    request: Request<proto::RemoveBinRequest>,
  ) -> Result<Response<Empty>, Status> {
    let owner_id = authenticated_user(&request)?;
    let req = request.into_inner();

    self
      .state
      .storage
      .remove_bin(owner_id, req.id.into())
      .await
      .map_err(map_mutation_error)?;

    self.state.hub.notify(owner_id).await;
    Ok(Response::new(Empty {}))
  }

  type GetDataStream = Pin<Box<dyn Stream<Item = Result<proto::Snapshot, Status>> + Send + 'static>>;

  async fn get_data(
    &self,
    request: Request<proto::GetDataRequest>,
  ) -> Result<Response<Self::GetDataStream>, Status> {
    let owner_id = authenticated_user(&request)?;

    let (domain_tx, mut domain_rx) = mpsc::channel::<Snapshot>(4);
    let (subscription_id, mut error_rx) = self
      .state
      .hub
      .subscribe(owner_id, domain_tx)
      .await
      .map_err(Status::from)?;

    let hub = self.state.hub.clone();
    let (out_tx, out_rx) = mpsc::channel::<Result<proto::Snapshot, Status>>(4);

    tokio::spawn(async move {
      loop {
        tokio::select! {
          biased;
          _ = out_tx.closed() => {
            hub.unsubscribe(owner_id, subscription_id).await;
            return;
          }
          result = &mut error_rx => {
            if let Ok(error) = result {
              let _ = out_tx.send(Err(error.into())).await;
            }
            hub.unsubscribe(owner_id, subscription_id).await;
            return;
          }
          maybe_snapshot = domain_rx.recv() => {
            match maybe_snapshot {
              Some(snapshot) => {
                if out_tx.send(Ok(snapshot.into())).await.is_err() {
                  hub.unsubscribe(owner_id, subscription_id).await;
                  return;
                }
              }
              None => {
                hub.unsubscribe(owner_id, subscription_id).await;
                return;
              }
            }
          }
        }
      }
    });

    Ok(Response::new(Box::pin(ReceiverStream::new(out_rx))))
  }
}
