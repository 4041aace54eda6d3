use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
  pub server: ServerConfig,
  pub auth: AuthConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
  pub addr: String,
  pub db_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
  /// HS256 signing secret, shared by the token service's encode/decode keys.
  pub secret: String,
}

impl AppConfig {
  /// Resolve the config from (in order) `datakeeper.yml`,
  /// `/etc/config/datakeeper.yml`, or the `DATAKEEPER_CONFIG` env var
  /// pointing at a YAML file.
  pub fn load() -> Result<Self> {
    let ret: std::result::Result<AppConfig, serde_yaml::Error> = match (
      File::open("datakeeper.yml"),
      File::open("/etc/config/datakeeper.yml"),
      env::var("DATAKEEPER_CONFIG"),
    ) {
      (Ok(reader), _, _) => serde_yaml::from_reader(reader),
      (_, Ok(reader), _) => serde_yaml::from_reader(reader),
      (_, _, Ok(path)) => serde_yaml::from_reader(File::open(path)?),
      _ => bail!("config file not found: set datakeeper.yml or DATAKEEPER_CONFIG"),
    };

    Ok(ret?)
  }
}
