//! Render plans for stored records
//!
//! A render plan lists what a results view can show for one record: the
//! populated input fields grouped by section, and one panel per result key
//! that is present and non-empty. Panels are independent; a missing or
//! malformed key never suppresses another.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::SimulationRecord;
use crate::schema::{SchemaVariant, SimulationInput};

// Result Series
// =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EfficiencyPoint {
  pub temperature: f64,
  pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MaterialPropertyPoint {
  pub temperature: f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hardness: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub strength: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub conductivity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecoveryPoint {
  pub time: f64,
  pub recovery: f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub grade: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PhPoint {
  pub time: f64,
  #[serde(rename = "pH")]
  pub ph: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EhPoint {
  pub time: f64,
  pub eh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RatioPoint {
  pub time: f64,
  pub ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChemistryProfiles {
  #[serde(rename = "pH", default, skip_serializing_if = "Option::is_none")]
  pub ph: Option<Vec<PhPoint>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub eh: Option<Vec<EhPoint>>,
  #[serde(rename = "fe3Fe2Ratio", default, skip_serializing_if = "Option::is_none")]
  pub fe_ratio: Option<Vec<RatioPoint>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KineticsAnalysis {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rate_constant: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reaction_order: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub activation_energy: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub half_life: Option<f64>,
}

impl KineticsAnalysis {
  pub fn is_empty(&self) -> bool {
    self.rate_constant.is_none()
      && self.reaction_order.is_none()
      && self.activation_energy.is_none()
      && self.half_life.is_none()
  }
}

/// Typed, lenient view of a stored `ai_result`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiResult {
  pub process_summary: Option<String>,
  pub recommended_method: Option<String>,
  pub temperature_data: Option<Vec<EfficiencyPoint>>,
  pub material_properties_data: Option<Vec<MaterialPropertyPoint>>,
  pub recovery_data: Option<Vec<RecoveryPoint>>,
  pub chemistry_profiles: Option<ChemistryProfiles>,
  pub kinetics_analysis: Option<KineticsAnalysis>,
  pub confidence_score: Option<f64>,
  pub predictions: Option<Map<String, Value>>,
}

fn decode<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Option<T> {
  object.get(key).filter(|value| !value.is_null()).and_then(|value| T::deserialize(value).ok())
}

fn text(object: &Map<String, Value>, key: &str) -> Option<String> {
  decode::<String>(object, key).filter(|text| !text.trim().is_empty())
}

fn series<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Option<Vec<T>> {
  decode::<Vec<T>>(object, key).filter(|points| !points.is_empty())
}

impl AiResult {
  /// Decode each key on its own; malformed or empty keys count as absent
  pub fn from_value(value: &Value) -> Self {
    let Some(object) = value.as_object() else {
      return Self::default();
    };

    let chemistry_profiles = object.get("chemistryProfiles").and_then(Value::as_object).map(|profiles| {
      ChemistryProfiles {
        ph: series(profiles, "pH"),
        eh: series(profiles, "eh"),
        fe_ratio: series(profiles, "fe3Fe2Ratio"),
      }
    });

    Self {
      process_summary: text(object, "processSummary"),
      recommended_method: text(object, "recommendedMethod"),
      temperature_data: series(object, "temperatureData"),
      material_properties_data: series(object, "materialPropertiesData"),
      recovery_data: series(object, "recoveryData"),
      chemistry_profiles,
      kinetics_analysis: decode::<KineticsAnalysis>(object, "kineticsAnalysis").filter(|k| !k.is_empty()),
      confidence_score: decode::<f64>(object, "confidenceScore").filter(|score| score.is_finite()),
      predictions: decode::<Map<String, Value>>(object, "predictions").filter(|map| !map.is_empty()),
    }
  }
}

// Panels
// ======

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
  High,
  Medium,
  Low,
}

impl ConfidenceBand {
  pub fn for_score(score: f64) -> Self {
    if score > 0.7 {
      ConfidenceBand::High
    } else if score > 0.5 {
      ConfidenceBand::Medium
    } else {
      ConfidenceBand::Low
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
  Confidence,
  Summary,
  Method,
  Kinetics,
  Recovery,
  Efficiency,
  Ph,
  Eh,
  FeRatio,
  MaterialProperties,
  Predictions,
}

/// One displayable unit of a results view
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Panel {
  Confidence { score: f64, band: ConfidenceBand },
  Summary { text: String },
  Method { text: String },
  Kinetics { analysis: KineticsAnalysis },
  Recovery { points: Vec<RecoveryPoint> },
  Efficiency { points: Vec<EfficiencyPoint> },
  Ph { points: Vec<PhPoint> },
  Eh { points: Vec<EhPoint> },
  FeRatio { points: Vec<RatioPoint> },
  MaterialProperties { points: Vec<MaterialPropertyPoint> },
  Predictions { entries: Map<String, Value> },
}

impl Panel {
  pub fn kind(&self) -> PanelKind {
    match self {
      Panel::Confidence { .. } => PanelKind::Confidence,
      Panel::Summary { .. } => PanelKind::Summary,
      Panel::Method { .. } => PanelKind::Method,
      Panel::Kinetics { .. } => PanelKind::Kinetics,
      Panel::Recovery { .. } => PanelKind::Recovery,
      Panel::Efficiency { .. } => PanelKind::Efficiency,
      Panel::Ph { .. } => PanelKind::Ph,
      Panel::Eh { .. } => PanelKind::Eh,
      Panel::FeRatio { .. } => PanelKind::FeRatio,
      Panel::MaterialProperties { .. } => PanelKind::MaterialProperties,
      Panel::Predictions { .. } => PanelKind::Predictions,
    }
  }
}

impl AiResult {
  /// Panels in display order
  pub fn panels(self) -> Vec<Panel> {
    let mut panels = Vec::new();
    let (ph, eh, fe_ratio) = match self.chemistry_profiles {
      Some(profiles) => (profiles.ph, profiles.eh, profiles.fe_ratio),
      None => (None, None, None),
    };

    if let Some(score) = self.confidence_score {
      panels.push(Panel::Confidence { score, band: ConfidenceBand::for_score(score) });
    }
    if let Some(text) = self.process_summary {
      panels.push(Panel::Summary { text });
    }
    if let Some(text) = self.recommended_method {
      panels.push(Panel::Method { text });
    }
    if let Some(analysis) = self.kinetics_analysis {
      panels.push(Panel::Kinetics { analysis });
    }
    if let Some(points) = self.recovery_data {
      panels.push(Panel::Recovery { points });
    }
    if let Some(points) = self.temperature_data {
      panels.push(Panel::Efficiency { points });
    }
    if let Some(points) = ph {
      panels.push(Panel::Ph { points });
    }
    if let Some(points) = eh {
      panels.push(Panel::Eh { points });
    }
    if let Some(points) = fe_ratio {
      panels.push(Panel::FeRatio { points });
    }
    if let Some(points) = self.material_properties_data {
      panels.push(Panel::MaterialProperties { points });
    }
    if let Some(entries) = self.predictions {
      panels.push(Panel::Predictions { entries });
    }
    panels
  }
}

// Plan
// ====

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct InputEntry {
  pub label: String,
  pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct InputSection {
  pub heading: String,
  pub entries: Vec<InputEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct RenderPlan {
  pub schema: SchemaVariant,
  pub input_sections: Vec<InputSection>,
  pub panels: Vec<Panel>,
}

/// Stored mining records carry every mining key, populated or not
fn stored_variant(input_data: &Map<String, Value>) -> SchemaVariant {
  if input_data.contains_key("mineralType") {
    SchemaVariant::Mining
  } else {
    SchemaVariant::detect(input_data)
  }
}

fn input_sections(input: &SimulationInput) -> Vec<InputSection> {
  let mut sections: Vec<InputSection> = Vec::new();
  let mut current = None;

  for (spec, value) in input.populated() {
    let entry = InputEntry { label: spec.label.to_string(), value: spec.display_value(value) };
    match sections.last_mut() {
      Some(section) if current == Some(spec.section) => section.entries.push(entry),
      _ => {
        sections.push(InputSection { heading: spec.section.heading().to_string(), entries: vec![entry] });
        current = Some(spec.section);
      }
    }
  }
  sections
}

impl RenderPlan {
  pub fn for_record(record: &SimulationRecord) -> Self {
    let empty = Map::new();
    let input_data = record.input_data.as_object().unwrap_or(&empty);

    let schema = stored_variant(input_data);
    let input = SimulationInput::with_variant(schema, input_data);

    Self { schema, input_sections: input_sections(&input), panels: AiResult::from_value(&record.ai_result).panels() }
  }

  pub fn has_panel(&self, kind: PanelKind) -> bool {
    self.panels.iter().any(|panel| panel.kind() == kind)
  }
}
