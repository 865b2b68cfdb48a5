//! Account profile endpoint

use axum::{
  extract::{Path, State},
  response::Json,
};

use crate::server::{extract::CurrentAccount, state::AppState};
use crate::session::{resolve_profile, AccountProfile};

/// GET /users/{id} - Best-effort profile, a placeholder when unavailable
pub async fn get(
  State(state): State<AppState>,
  CurrentAccount(_account): CurrentAccount,
  Path(id): Path<String>,
) -> Json<AccountProfile> {
  Json(resolve_profile(state.directory.as_deref(), &id).await)
}
