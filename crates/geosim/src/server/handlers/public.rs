//! Knowledge hub endpoints over public records

use axum::{
  extract::{Path, Query, State},
  response::Json,
};
use futures::future::join_all;

use crate::error::ApiError;
use crate::render::RenderPlan;
use crate::server::{extract::CurrentAccount, state::AppState, types::PublicSimulationDetail};
use crate::session::resolve_profile;
use crate::views::{KnowledgeHubEntry, KnowledgeHubQuery, KnowledgeHubView, SimulationSummary};

/// GET /public/simulations - Public records with author attribution
pub async fn list(
  State(state): State<AppState>,
  CurrentAccount(_account): CurrentAccount,
  Query(query): Query<KnowledgeHubQuery>,
) -> Result<Json<KnowledgeHubView>, ApiError> {
  let records = state.store.list_public().await?;
  let selected = KnowledgeHubView::select(&records, &query);

  let directory = state.directory.as_deref();
  let authors = join_all(selected.iter().map(|record| resolve_profile(directory, &record.user_id))).await;

  let simulations = selected
    .into_iter()
    .zip(authors)
    .map(|(record, author)| KnowledgeHubEntry { summary: SimulationSummary::from(record), author })
    .collect();

  Ok(Json(KnowledgeHubView { simulations, materials: KnowledgeHubView::materials(&records) }))
}

/// GET /public/simulations/{id} - One public record, never a private one
pub async fn get(
  State(state): State<AppState>,
  CurrentAccount(_account): CurrentAccount,
  Path(id): Path<String>,
) -> Result<Json<PublicSimulationDetail>, ApiError> {
  let simulation = state
    .store
    .find_public(&id)
    .await?
    .filter(|record| record.is_public())
    .ok_or_else(|| ApiError::not_found("Simulation not found"))?;

  let author = resolve_profile(state.directory.as_deref(), &simulation.user_id).await;
  let plan = RenderPlan::for_record(&simulation);
  Ok(Json(PublicSimulationDetail { simulation, plan, author }))
}
