//! Shared handler state

use std::sync::Arc;

use crate::activity::ActivityLog;
use crate::lifecycle::SimulationService;
use crate::session::{AccountDirectory, SessionProvider};
use crate::store::RecordStore;

#[derive(Clone)]
pub struct AppState {
  pub sessions: Arc<dyn SessionProvider>,
  pub store: Arc<dyn RecordStore>,
  /// Account lookups; attribution falls back to a placeholder without one
  pub directory: Option<Arc<dyn AccountDirectory>>,
  pub simulations: Arc<SimulationService>,
  pub activity: ActivityLog,
}
