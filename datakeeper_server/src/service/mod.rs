pub mod convert;
pub mod data_keeper_service;
pub mod user_service;

pub use data_keeper_service::DataKeeperImpl;
pub use user_service::UserServiceImpl;
