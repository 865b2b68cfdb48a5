//! Simulation submission endpoint

use axum::{
  extract::{Extension, State},
  response::Json,
};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::server::{
  extract::{CurrentAccount, JsonBody}, middleware::RequestContext, state::AppState, types::SimulateResponse,
};

/// POST /simulate - Run a submission through the model and store the record
pub async fn simulate(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  CurrentAccount(account): CurrentAccount,
  JsonBody(submission): JsonBody<Map<String, Value>>,
) -> Result<Json<SimulateResponse>, ApiError> {
  context.log_info("Running simulation", "simulate").await;

  match state.simulations.run(&account, &submission).await {
    Ok(record) => {
      context.log_success(&format!("Stored simulation {}", record.id), "simulate").await;
      Ok(Json(SimulateResponse { id: record.id }))
    }
    Err(e) => {
      context.log_error(&format!("Simulation failed: {e}"), "simulate").await;
      Err(e.into())
    }
  }
}
