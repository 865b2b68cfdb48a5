//! REST server startup and configuration

use anyhow::{Context, Result};
use axum::serve;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::activity::ActivityLog;
use crate::config::{Config, StoreBackend};
use crate::lifecycle::SimulationService;
use crate::model::OpenAiChatModel;
use crate::normalizer::Normalizer;
use crate::server::{routing::create_router, state::AppState};
use crate::session::{
  Account, AccountDirectory, HostedAccountDirectory, HostedSessionProvider, SessionProvider,
  StaticSessionProvider,
};
use crate::store::{HostedRecordStore, MemoryRecordStore, RecordStore};

/// Bearer token accepted by the in-memory backend
pub const DEV_TOKEN: &str = "dev-token";
pub const DEV_ACCOUNT: &str = "local-dev";

type Backends = (Arc<dyn RecordStore>, Arc<dyn SessionProvider>, Option<Arc<dyn AccountDirectory>>);

fn backends(config: &Config) -> Result<Backends> {
  match config.store.backend {
    StoreBackend::Memory => {
      tracing::warn!("Using the in-memory store; records are lost on exit. Sign in with bearer '{DEV_TOKEN}'");
      let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
      let sessions: Arc<dyn SessionProvider> =
        Arc::new(StaticSessionProvider::new().with_session(DEV_TOKEN, Account::new(DEV_ACCOUNT)));
      Ok((store, sessions, None))
    }
    StoreBackend::Hosted => {
      let url = config.store.url.as_deref().context("store.url is required for the hosted backend")?;
      let anon_key = config.store.anon_key.as_deref().context("store.anon_key is required")?;
      let store_key = config.store_key().unwrap_or(anon_key);

      let store: Arc<dyn RecordStore> = Arc::new(HostedRecordStore::new(url, store_key, &config.store.table));
      let sessions: Arc<dyn SessionProvider> = Arc::new(HostedSessionProvider::new(url, anon_key));
      let directory = config
        .store
        .service_role_key
        .as_deref()
        .map(|key| Arc::new(HostedAccountDirectory::new(url, key)) as Arc<dyn AccountDirectory>);
      if directory.is_none() {
        tracing::warn!("No service role key configured; author attribution falls back to a placeholder");
      }

      Ok((store, sessions, directory))
    }
  }
}

/// Wire adapters, pipeline and activity log from configuration
pub fn build_state(config: &Config) -> Result<AppState> {
  let activity_path = config.activity_log_path();
  let activity = ActivityLog::open(&activity_path)
    .with_context(|| format!("Failed to open activity log {}", activity_path.display()))?;

  let api_key = config.model.api_key.clone().context("model.api_key is required")?;
  let model = Arc::new(OpenAiChatModel::new(&config.model, api_key));

  let normalizer = match config.normalizer.seed {
    Some(seed) => Normalizer::seeded(seed),
    None => Normalizer::from_entropy(),
  };

  let (store, sessions, directory) = backends(config)?;
  let simulations = Arc::new(SimulationService::new(model, store.clone(), normalizer));

  Ok(AppState { sessions, store, directory, simulations, activity })
}

/// Start the REST server
#[cfg(not(tarpaulin_include))] // Skip coverage - binds a socket and serves until shutdown
pub async fn start_server(config: Config) -> Result<()> {
  config.validate()?;
  let state = build_state(&config)?;
  let activity = state.activity.clone();
  let addr = config.server.bind;

  activity.info(&format!("Starting GeoSim REST server on {addr}"), "geosim-server").await;

  let app = create_router(state)
    .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()));

  let listener = TcpListener::bind(addr).await.with_context(|| format!("Failed to bind {addr}"))?;
  activity.info(&format!("Server listening on {addr}"), "geosim-server").await;

  match serve(listener, app).await {
    Ok(()) => {
      activity.info("Server shutdown gracefully", "geosim-server").await;
      Ok(())
    }
    Err(e) => {
      activity.error(&format!("Server error: {e}"), "geosim-server").await;
      Err(anyhow::anyhow!("Server error: {e}"))
    }
  }
}
