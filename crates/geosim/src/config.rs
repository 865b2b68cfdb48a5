//! Configuration for the GeoSim server
//!
//! Loaded once at startup from an optional YAML file, then overridden by
//! command-line flags and environment variables in the server binary.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Failed to read config file {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse config file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("Invalid configuration: {0}")]
  Invalid(String),
}

impl ConfigError {
  pub fn invalid(message: impl Into<String>) -> Self {
    Self::Invalid(message.into())
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub server: ServerConfig,
  #[serde(default)]
  pub store: StoreConfig,
  #[serde(default)]
  pub model: ModelConfig,
  #[serde(default)]
  pub normalizer: NormalizerConfig,
  #[serde(default)]
  pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_bind")]
  pub bind: SocketAddr,
}

/// Which record store and session backend the server talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
  #[default]
  Hosted,
  /// In-process store with a static development session
  Memory,
}

/// Hosted project settings; the auth endpoints share the url and keys
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
  #[serde(default)]
  pub backend: StoreBackend,
  #[serde(default)]
  pub url: Option<String>,
  #[serde(default)]
  pub anon_key: Option<String>,
  /// Admin key for account lookups and owner-filtered table access
  #[serde(default)]
  pub service_role_key: Option<String>,
  #[serde(default = "default_table")]
  pub table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
  #[serde(default = "default_model_base_url")]
  pub base_url: String,
  #[serde(default)]
  pub api_key: Option<String>,
  #[serde(default = "default_model")]
  pub model: String,
  #[serde(default = "default_temperature")]
  pub temperature: f32,
  #[serde(default = "default_max_tokens")]
  pub max_tokens: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizerConfig {
  /// Fixed seed for fallback jitter; entropy when unset
  #[serde(default)]
  pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
  /// Activity log path; `~/.geosim/activity.jsonl` when unset
  #[serde(default)]
  pub activity_log: Option<PathBuf>,
}

// Defaults
// ========

fn default_bind() -> SocketAddr {
  SocketAddr::from(([127, 0, 0, 1], 3000))
}
fn default_table() -> String {
  "simulations".to_string()
}
fn default_model_base_url() -> String {
  "https://api.openai.com/v1".to_string()
}
fn default_model() -> String {
  "gpt-4".to_string()
}
fn default_temperature() -> f32 {
  0.7
}
fn default_max_tokens() -> u32 {
  3000
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self { bind: default_bind() }
  }
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      backend: StoreBackend::default(),
      url: None,
      anon_key: None,
      service_role_key: None,
      table: default_table(),
    }
  }
}

impl Default for ModelConfig {
  fn default() -> Self {
    Self {
      base_url: default_model_base_url(),
      api_key: None,
      model: default_model(),
      temperature: default_temperature(),
      max_tokens: default_max_tokens(),
    }
  }
}

/// `~/.geosim`, falling back to the working directory without a home
pub fn geosim_dir() -> PathBuf {
  dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".geosim")
}

impl Config {
  pub fn default_path() -> PathBuf {
    geosim_dir().join("config.yaml")
  }

  pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path)
      .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    Self::from_yaml(&content).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
  }

  pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
    if content.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(content)
  }

  /// Explicit path must exist; the default path is optional
  pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
    if let Some(path) = path {
      return Self::load_from_file(path);
    }

    let default_path = Self::default_path();
    if default_path.exists() {
      Self::load_from_file(&default_path)
    } else {
      Ok(Self::default())
    }
  }

  pub fn activity_log_path(&self) -> PathBuf {
    self.logging.activity_log.clone().unwrap_or_else(|| geosim_dir().join("activity.jsonl"))
  }

  /// Key used for table access and account lookups
  pub fn store_key(&self) -> Option<&str> {
    self.store.service_role_key.as_deref().or(self.store.anon_key.as_deref())
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    check_url("model.base_url", &self.model.base_url)?;

    if !(self.model.temperature > 0.0 && self.model.temperature <= 2.0) {
      return Err(ConfigError::invalid("model.temperature must be in (0, 2]"));
    }
    if self.model.max_tokens == 0 {
      return Err(ConfigError::invalid("model.max_tokens must be positive"));
    }
    if self.model.api_key.as_deref().is_none_or(str::is_empty) {
      return Err(ConfigError::invalid("model.api_key is required (set OPENAI_API_KEY)"));
    }

    if self.store.backend == StoreBackend::Hosted {
      let url = self.store.url.as_deref().ok_or_else(|| ConfigError::invalid("store.url is required"))?;
      check_url("store.url", url)?;
      if self.store.anon_key.as_deref().is_none_or(str::is_empty) {
        return Err(ConfigError::invalid("store.anon_key is required for the hosted backend"));
      }
      if self.store.table.trim().is_empty() {
        return Err(ConfigError::invalid("store.table must not be empty"));
      }
    }

    Ok(())
  }
}

fn check_url(field: &str, value: &str) -> Result<(), ConfigError> {
  let url = Url::parse(value).map_err(|e| ConfigError::invalid(format!("{field}: {e}")))?;
  match url.scheme() {
    "http" | "https" => Ok(()),
    other => Err(ConfigError::invalid(format!("{field}: unsupported scheme '{other}'"))),
  }
}
