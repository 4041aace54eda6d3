// Generated protocol code for the DataKeeper wire protocol, shared between
// the server and terminal client crates.

pub use prost;
pub use prost_types;
pub use tonic;

pub mod datakeeper {
  pub mod v1 {
    tonic::include_proto!("datakeeper.v1");

    pub use self::{
      data_keeper_client::DataKeeperClient,
      data_keeper_server::{DataKeeper, DataKeeperServer},
      user_service_client::UserServiceClient,
      user_service_server::{UserService, UserServiceServer},
    };
  }
}

pub use datakeeper::v1::*;
