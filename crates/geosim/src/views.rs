//! List views over stored records
//!
//! Filtering happens in-process over what the store returned. Public views
//! re-check visibility on every record they are handed.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::record::SimulationRecord;
use crate::session::AccountProfile;

const DASHBOARD_RECENT: usize = 5;

// Queries
// =======

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
  #[default]
  All,
  Public,
  Private,
}

impl StatusFilter {
  pub fn matches(self, record: &SimulationRecord) -> bool {
    match self {
      StatusFilter::All => true,
      StatusFilter::Public => record.is_public(),
      StatusFilter::Private => !record.is_public(),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct MySimulationsQuery {
  #[serde(default)]
  pub search: Option<String>,
  #[serde(default)]
  pub status: StatusFilter,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct KnowledgeHubQuery {
  #[serde(default)]
  pub search: Option<String>,
  /// Exact material type; `all` or empty means no filter
  #[serde(default)]
  pub material: Option<String>,
}

/// Case-insensitive match against title, goal and material type
pub fn matches_search(record: &SimulationRecord, search: Option<&str>) -> bool {
  let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase) else {
    return true;
  };

  [record.title.as_deref(), record.goal(), record.material()]
    .into_iter()
    .flatten()
    .any(|haystack| haystack.to_lowercase().contains(&needle))
}

// Summaries
// =========

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SimulationSummary {
  pub id: String,
  pub title: String,
  pub goal: Option<String>,
  pub material: Option<String>,
  pub is_public: bool,
  pub created_at: DateTime<Utc>,
  pub tags: Vec<String>,
  pub confidence_score: Option<f64>,
}

impl From<&SimulationRecord> for SimulationSummary {
  fn from(record: &SimulationRecord) -> Self {
    Self {
      id: record.id.clone(),
      title: record.title.clone().unwrap_or_else(|| crate::schema::UNTITLED.to_string()),
      goal: record.goal().map(str::to_string),
      material: record.material().map(str::to_string),
      is_public: record.is_public(),
      created_at: record.created_at,
      tags: record.tags.clone().unwrap_or_default(),
      confidence_score: record.confidence_score(),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct VisibilityCounts {
  pub total: usize,
  pub public: usize,
  pub private: usize,
}

impl VisibilityCounts {
  /// `null` visibility counts as private
  pub fn of(records: &[SimulationRecord]) -> Self {
    let public = records.iter().filter(|record| record.is_public()).count();
    Self { total: records.len(), public, private: records.len() - public }
  }
}

// Views
// =====

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct MySimulationsView {
  pub simulations: Vec<SimulationSummary>,
  /// Counts over all owned records, before filtering
  pub counts: VisibilityCounts,
}

impl MySimulationsView {
  pub fn build(records: &[SimulationRecord], query: &MySimulationsQuery) -> Self {
    let simulations = records
      .iter()
      .filter(|record| matches_search(record, query.search.as_deref()) && query.status.matches(record))
      .map(SimulationSummary::from)
      .collect();
    Self { simulations, counts: VisibilityCounts::of(records) }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct DashboardView {
  pub counts: VisibilityCounts,
  pub recent: Vec<SimulationSummary>,
}

impl DashboardView {
  /// Records are expected newest first
  pub fn build(records: &[SimulationRecord]) -> Self {
    Self {
      counts: VisibilityCounts::of(records),
      recent: records.iter().take(DASHBOARD_RECENT).map(SimulationSummary::from).collect(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct KnowledgeHubEntry {
  #[serde(flatten)]
  pub summary: SimulationSummary,
  pub author: AccountProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct KnowledgeHubView {
  pub simulations: Vec<KnowledgeHubEntry>,
  /// Distinct material types across all public records, for the filter
  pub materials: Vec<String>,
}

impl KnowledgeHubView {
  /// Public records matching the query, before author attribution
  pub fn select<'a>(records: &'a [SimulationRecord], query: &KnowledgeHubQuery) -> Vec<&'a SimulationRecord> {
    let material = query.material.as_deref().map(str::trim).filter(|m| !m.is_empty() && *m != "all");
    records
      .iter()
      .filter(|record| record.is_public())
      .filter(|record| matches_search(record, query.search.as_deref()))
      .filter(|record| material.is_none_or(|material| record.material() == Some(material)))
      .collect()
  }

  pub fn materials(records: &[SimulationRecord]) -> Vec<String> {
    let distinct: BTreeSet<&str> =
      records.iter().filter(|record| record.is_public()).filter_map(SimulationRecord::material).collect();
    distinct.into_iter().map(str::to_string).collect()
  }
}
