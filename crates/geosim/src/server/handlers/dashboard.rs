//! Dashboard endpoint

use axum::{extract::State, response::Json};

use crate::error::ApiError;
use crate::server::{extract::CurrentAccount, state::AppState};
use crate::views::DashboardView;

/// GET /dashboard - Visibility counts and recent records of the caller
pub async fn dashboard(
  State(state): State<AppState>,
  CurrentAccount(account): CurrentAccount,
) -> Result<Json<DashboardView>, ApiError> {
  let records = state.store.list_owned(&account.id).await?;
  Ok(Json(DashboardView::build(&records)))
}
