//! GeoSim REST Server
//!
//! HTTP API for submitting simulations and managing the resulting records.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use geosim::config::{Config, StoreBackend};
use geosim::server::startup::start_server;

#[derive(Parser)]
#[command(name = "geosim_server")]
#[command(about = "GeoSim REST API Server")]
#[command(version)]
struct Args {
  /// YAML config file (defaults to ~/.geosim/config.yaml when present)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Server bind address
  #[arg(long)]
  bind: Option<SocketAddr>,

  /// Hosted project URL
  #[arg(long, env = "GEOSIM_STORE_URL")]
  store_url: Option<String>,

  /// Hosted project public key
  #[arg(long, env = "GEOSIM_STORE_ANON_KEY", hide_env_values = true)]
  store_anon_key: Option<String>,

  /// Hosted project service role key
  #[arg(long, env = "GEOSIM_STORE_SERVICE_KEY", hide_env_values = true)]
  store_service_key: Option<String>,

  /// Model provider API key
  #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
  model_api_key: Option<String>,

  /// Chat model name
  #[arg(long, env = "GEOSIM_MODEL")]
  model: Option<String>,

  /// Use the in-memory store with a static development session
  #[arg(long)]
  memory_store: bool,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,
}

impl Args {
  fn apply(self, config: &mut Config) {
    if let Some(bind) = self.bind {
      config.server.bind = bind;
    }
    if let Some(url) = self.store_url {
      config.store.url = Some(url);
    }
    if let Some(key) = self.store_anon_key {
      config.store.anon_key = Some(key);
    }
    if let Some(key) = self.store_service_key {
      config.store.service_role_key = Some(key);
    }
    if let Some(key) = self.model_api_key {
      config.model.api_key = Some(key);
    }
    if let Some(model) = self.model {
      config.model.model = model;
    }
    if self.memory_store {
      config.store.backend = StoreBackend::Memory;
    }
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let filter = if args.verbose {
    EnvFilter::new("geosim=debug,tower_http=debug,info")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("geosim=info,tower_http=info,warn"))
  };
  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
  args.apply(&mut config);

  tracing::info!("Starting GeoSim REST Server v{}", env!("CARGO_PKG_VERSION"));
  tracing::info!("Binding to address: {}", config.server.bind);

  start_server(config).await
}
