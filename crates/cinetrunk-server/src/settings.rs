//! Server configuration: an optional TOML file layered under `CINETRUNK_*`
//! environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use cinetrunk_api::moviedb::MovieDbConfig;
use config::{
  Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState,
};
use serde::Deserialize;

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 5001 }
fn default_store_path() -> PathBuf { PathBuf::from("cinetrunk.db") }
fn default_token_ttl_secs() -> u64 { 3600 }
fn default_request_timeout_secs() -> u64 { 30 }
fn default_reap_interval_secs() -> u64 { 3600 }

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  #[serde(default = "default_store_path")]
  pub store_path:           PathBuf,
  /// HS256 secret for login tokens. Required.
  pub jwt_secret:           String,
  #[serde(default = "default_token_ttl_secs")]
  pub token_ttl_secs:       u64,
  #[serde(default = "default_request_timeout_secs")]
  pub request_timeout_secs: u64,
  /// How often expired activities are physically removed.
  #[serde(default = "default_reap_interval_secs")]
  pub reap_interval_secs:   u64,
  #[serde(default)]
  pub movie_db:             MovieDbConfig,
}

impl ServerConfig {
  /// Read `path` (if it exists) and apply environment overrides, e.g.
  /// `CINETRUNK_PORT` or `CINETRUNK_MOVIE_DB__API_KEY`.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_builder(Config::builder().add_source(File::from(path).required(false)))
  }

  fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
    builder
      .add_source(
        Environment::with_prefix("CINETRUNK")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn token_ttl(&self) -> chrono::Duration {
    chrono::Duration::seconds(i64::try_from(self.token_ttl_secs).unwrap_or(i64::MAX))
  }

  pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }

  pub fn reap_interval(&self) -> Duration {
    Duration::from_secs(self.reap_interval_secs.max(1))
  }

  /// `store_path` with a leading `~/` expanded.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
