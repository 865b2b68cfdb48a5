//! REST API types with schemars annotations

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::activity::ActivityEntry;
use crate::record::SimulationRecord;
use crate::schema::SchemaVariant;
use crate::render::RenderPlan;
use crate::session::AccountProfile;

// Simulations
// ===========

/// Response for POST /simulate
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SimulateResponse {
  pub id: String,
}

/// Record plus what a results view can show for it
#[derive(Debug, Serialize, JsonSchema)]
pub struct SimulationDetail {
  pub simulation: SimulationRecord,
  pub plan: RenderPlan,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PublicSimulationDetail {
  pub simulation: SimulationRecord,
  pub plan: RenderPlan,
  pub author: AccountProfile,
}

/// Response for PATCH /simulations/{id}
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VisibilityResponse {
  pub success: bool,
  pub data: SimulationRecord,
}

/// Response for DELETE /simulations/{id}
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteResponse {
  pub success: bool,
  pub message: String,
}

// Templates
// =========

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct TemplatesQuery {
  /// Only presets for this form
  #[serde(default)]
  pub schema: Option<SchemaVariant>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TemplateSummary {
  pub key: String,
  pub label: String,
  pub category: String,
  pub schema: SchemaVariant,
}

/// Populated form for one preset
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TemplateDetail {
  pub key: String,
  pub label: String,
  pub category: String,
  pub schema: SchemaVariant,
  pub fields: Map<String, Value>,
}

// Status and Logs
// ===============

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StatusResponse {
  pub status: String,
  pub version: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VersionResponse {
  pub version: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct LogsQuery {
  #[serde(default)]
  pub limit: Option<usize>,
  /// `info`, `success`, `warn`, `error` or `all`
  #[serde(default)]
  pub level: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LogsResponse {
  pub logs: Vec<ActivityEntry>,
}
