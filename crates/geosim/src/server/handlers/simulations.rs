//! Owner-scoped record endpoints

use axum::{
  extract::{Extension, Path, Query, State},
  response::Json,
};
use serde_json::Value;

use crate::error::ApiError;
use crate::render::RenderPlan;
use crate::server::{
  extract::{CurrentAccount, JsonBody},
  middleware::RequestContext,
  state::AppState,
  types::{DeleteResponse, SimulationDetail, VisibilityResponse},
};
use crate::views::{MySimulationsQuery, MySimulationsView};

const NOT_FOUND: &str = "Simulation not found";

/// Existence then ownership, so a foreign record answers 403 and a missing one 404
async fn ensure_owner(state: &AppState, id: &str, account_id: &str) -> Result<(), ApiError> {
  match state.store.owner_of(id).await? {
    None => Err(ApiError::not_found(NOT_FOUND)),
    Some(owner) if owner != account_id => Err(ApiError::forbidden("Forbidden")),
    Some(_) => Ok(()),
  }
}

/// GET /simulations - The caller's records, filtered
pub async fn list(
  State(state): State<AppState>,
  CurrentAccount(account): CurrentAccount,
  Query(query): Query<MySimulationsQuery>,
) -> Result<Json<MySimulationsView>, ApiError> {
  let records = state.store.list_owned(&account.id).await?;
  Ok(Json(MySimulationsView::build(&records, &query)))
}

/// GET /simulations/{id} - One owned record with its render plan
pub async fn get(
  State(state): State<AppState>,
  CurrentAccount(account): CurrentAccount,
  Path(id): Path<String>,
) -> Result<Json<SimulationDetail>, ApiError> {
  let simulation =
    state.store.find_owned(&id, &account.id).await?.ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
  let plan = RenderPlan::for_record(&simulation);
  Ok(Json(SimulationDetail { simulation, plan }))
}

/// PATCH /simulations/{id} - Set `is_public`
pub async fn update_visibility(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  CurrentAccount(account): CurrentAccount,
  Path(id): Path<String>,
  JsonBody(body): JsonBody<Value>,
) -> Result<Json<VisibilityResponse>, ApiError> {
  let is_public = body
    .get("is_public")
    .and_then(Value::as_bool)
    .ok_or_else(|| ApiError::bad_request("is_public must be a boolean"))?;

  if let Err(e) = ensure_owner(&state, &id, &account.id).await {
    context.log_warn(&format!("Visibility change on {id} rejected: {e}"), "simulations").await;
    return Err(e);
  }

  let data = state
    .store
    .set_visibility(&id, &account.id, is_public)
    .await?
    .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

  context.log_success(&format!("Simulation {id} is_public={is_public}"), "simulations").await;
  Ok(Json(VisibilityResponse { success: true, data }))
}

/// DELETE /simulations/{id}
pub async fn delete(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  CurrentAccount(account): CurrentAccount,
  Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
  if let Err(e) = ensure_owner(&state, &id, &account.id).await {
    context.log_warn(&format!("Delete of {id} rejected: {e}"), "simulations").await;
    return Err(e);
  }

  if !state.store.delete_owned(&id, &account.id).await? {
    return Err(ApiError::not_found(NOT_FOUND));
  }

  context.log_success(&format!("Deleted simulation {id}"), "simulations").await;
  Ok(Json(DeleteResponse { success: true, message: "Simulation deleted successfully".to_string() }))
}
