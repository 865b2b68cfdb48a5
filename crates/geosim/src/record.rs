//! Persisted simulation records

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of an account in the hosted auth service
pub type AccountId = String;

/// One stored simulation input/output pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SimulationRecord {
  pub id: String,
  pub user_id: AccountId,
  #[serde(default)]
  pub title: Option<String>,
  pub input_data: Value,
  pub ai_result: Value,
  /// `None` and `Some(false)` both mean private
  #[serde(default)]
  pub is_public: Option<bool>,
  pub created_at: DateTime<Utc>,
  #[serde(default)]
  pub tags: Option<Vec<String>>,
}

impl SimulationRecord {
  pub fn is_public(&self) -> bool {
    self.is_public == Some(true)
  }

  fn input_text(&self, key: &str) -> Option<&str> {
    self.input_data.get(key).and_then(Value::as_str).filter(|text| !text.trim().is_empty())
  }

  pub fn goal(&self) -> Option<&str> {
    self.input_text("goal")
  }

  /// Mineral type for mining records, material type for materials records
  pub fn material(&self) -> Option<&str> {
    self.input_text("mineralType").or_else(|| self.input_text("materialType"))
  }

  pub fn confidence_score(&self) -> Option<f64> {
    self.ai_result.get("confidenceScore").and_then(Value::as_f64)
  }
}

/// Insert payload; the store assigns `id` and `created_at`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSimulation {
  pub user_id: AccountId,
  pub title: String,
  pub input_data: Value,
  pub ai_result: Value,
  pub is_public: bool,
}
