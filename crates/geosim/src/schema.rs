//! Input form schemas
//!
//! GeoSim accepts two flat form layouts: the generic materials-science form
//! and the mining / leach-process form. Both are described by a fixed
//! field table (key, display label, unit, section) that drives variant
//! detection, prompt assembly, persisted `input_data` and rendering.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Title used when neither a title nor a goal was submitted
pub const UNTITLED: &str = "Untitled Simulation";

const TITLE_MAX_CHARS: usize = 100;

// Field Tables
// ============

/// Section headings, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
  ResearchParameters,
  ApplicationContext,
  Basic,
  LeachChemistry,
  Mineralogical,
  Operational,
  Energy,
  Environmental,
  Advanced,
  Additional,
}

impl Section {
  pub fn heading(self) -> &'static str {
    match self {
      Section::ResearchParameters => "Research Parameters",
      Section::ApplicationContext => "Application Context",
      Section::Basic => "Basic Parameters",
      Section::LeachChemistry => "Leach Chemistry",
      Section::Mineralogical => "Mineralogical Inputs",
      Section::Operational => "Operational Inputs",
      Section::Energy => "Energy Inputs (HVP)",
      Section::Environmental => "Environmental Inputs",
      Section::Advanced => "Advanced Parameters",
      Section::Additional => "Additional Information",
    }
  }
}

/// One form field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
  pub key: &'static str,
  pub label: &'static str,
  pub unit: Option<&'static str>,
  pub section: Section,
}

const fn field(
  key: &'static str,
  label: &'static str,
  unit: Option<&'static str>,
  section: Section,
) -> FieldSpec {
  FieldSpec { key, label, unit, section }
}

impl FieldSpec {
  /// Render a value with this field's unit attached
  pub fn display_value(&self, value: &str) -> String {
    match self.unit {
      Some(unit @ ("%" | "°C")) => format!("{value}{unit}"),
      Some(unit) => format!("{value} {unit}"),
      None => value.to_string(),
    }
  }
}

use Section::*;

pub const MATERIALS_FIELDS: &[FieldSpec] = &[
  field("goal", "Research Goal", None, ResearchParameters),
  field("materialType", "Material Type", None, ResearchParameters),
  field("composition", "Composition", None, ResearchParameters),
  field("conditions", "Experimental Conditions", None, ResearchParameters),
  field("application", "Application Area", None, ApplicationContext),
  field("targetProperties", "Target Properties", None, ApplicationContext),
  field("processingMethod", "Processing Method", None, ApplicationContext),
  field("priority", "Priority Focus", None, ApplicationContext),
  field("constraints", "Constraints & Limitations", None, ApplicationContext),
];

pub const MINING_FIELDS: &[FieldSpec] = &[
  field("goal", "Primary Objective", None, Basic),
  field("mineralType", "Mineral Type", None, Basic),
  field("template", "Simulation Template", None, Basic),
  field("pH", "pH Setpoint", None, LeachChemistry),
  field("eh", "Redox Potential (Eh)", Some("mV"), LeachChemistry),
  field("orp", "ORP", Some("mV"), LeachChemistry),
  field("acidConcentration", "Acid Concentration", Some("g/L"), LeachChemistry),
  field("fe3Concentration", "Fe³⁺ Concentration", Some("g/L"), LeachChemistry),
  field("fe2Concentration", "Fe²⁺ Concentration", Some("g/L"), LeachChemistry),
  field("oxidantType", "Oxidant Type", None, LeachChemistry),
  field("oxidantDosage", "Oxidant Dosage", Some("g/L"), LeachChemistry),
  field("sulfateConcentration", "Sulfate Concentration", Some("g/L"), LeachChemistry),
  field("mineralComposition", "Mineral Composition/Assay", None, Mineralogical),
  field("chalcopyritePercent", "Chalcopyrite", Some("%"), Mineralogical),
  field("pyritePercent", "Pyrite", Some("%"), Mineralogical),
  field("bornitePercent", "Bornite", Some("%"), Mineralogical),
  field("alterationMinerals", "Alteration Minerals", None, Mineralogical),
  field("gangueMatrix", "Gangue Matrix", None, Mineralogical),
  field("residenceTime", "Residence Time", Some("hours"), Operational),
  field("grainSize", "Grain Size", Some("µm"), Operational),
  field("temperature", "Temperature", Some("°C"), Operational),
  field("pulpDensity", "Pulp Density", Some("%"), Operational),
  field("particleSize", "Particle Size", Some("µm"), Operational),
  field("particleLiberation", "Particle Liberation", Some("%"), Operational),
  field("agitationRate", "Agitation/Mixing Rate", Some("rpm"), Operational),
  field("pressure", "Pressure", Some("atm"), Operational),
  field("reagentSchedule", "Reagent Schedule", None, Operational),
  field("voltage", "Voltage", Some("kV"), Energy),
  field("pulseFrequency", "Pulse Frequency", Some("Hz"), Energy),
  field("pulseEnergy", "Pulse Energy", Some("kWh/t"), Energy),
  field("specificEnergy", "Specific Energy", Some("kWh/t"), Energy),
  field("hvpTargetedLiberation", "Targeted Liberation after HVP", Some("%"), Energy),
  field("fragmentationModel", "Fragmentation Model", None, Energy),
  field("atmosphere", "Atmosphere", None, Environmental),
  field("leachMedium", "Leach Medium", None, Environmental),
  field("dissolvedOxygen", "Dissolved Oxygen", Some("mg/L"), Environmental),
  field("oxygenFlowRate", "Oxygen Flow Rate", Some("L/min"), Environmental),
  field("solidToLiquidRatio", "Solid-to-Liquid Ratio", None, Environmental),
  field("oxidativePotential", "Oxidative Potential", Some("mV"), Environmental),
  field("redoxControl", "Redox Control", None, Environmental),
  field("particleLiberationIndex", "Particle Liberation Index", None, Environmental),
  field("diffusionCoefficient", "Diffusion Coefficient", None, Advanced),
  field("shrinkingCoreModel", "Shrinking Core Model", None, Advanced),
  field("rateConstantOverride", "Rate Constant (k)", None, Advanced),
  field("activationEnergy", "Activation Energy", Some("kJ/mol"), Advanced),
  field("reactionOrder", "Reaction Order", None, Advanced),
  field("gangueAcidConsumption", "Gangue Acid Consumption (GAC)", Some("kg/t"), Advanced),
  field("ferricRegenerationEfficiency", "Ferric Regeneration Efficiency", Some("%"), Advanced),
  field("surfacePassivation", "Surface Passivation", None, Advanced),
  field("particleShapeFactor", "Particle Shape Factor", None, Advanced),
  field("composition", "Composition Notes", None, Additional),
  field("constraints", "Constraints", None, Additional),
];

// Variants
// ========

/// Which form layout a record was submitted with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVariant {
  Materials,
  Mining,
}

impl SchemaVariant {
  pub fn fields(self) -> &'static [FieldSpec] {
    match self {
      SchemaVariant::Materials => MATERIALS_FIELDS,
      SchemaVariant::Mining => MINING_FIELDS,
    }
  }

  /// Mining when any mining-only field is populated, materials otherwise
  pub fn detect(fields: &Map<String, Value>) -> Self {
    let mining_only = MINING_FIELDS
      .iter()
      .filter(|spec| !MATERIALS_FIELDS.iter().any(|shared| shared.key == spec.key));

    for spec in mining_only {
      if fields.get(spec.key).and_then(field_value).is_some() {
        return SchemaVariant::Mining;
      }
    }
    SchemaVariant::Materials
  }
}

/// One populated field: its prompt text and the JSON value persisted for it
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
  pub text: String,
  pub value: Value,
}

/// Normalize one submitted value: trimmed non-empty strings and numbers count
pub fn field_value(value: &Value) -> Option<FieldValue> {
  match value {
    Value::String(text) => {
      let trimmed = text.trim();
      (!trimmed.is_empty())
        .then(|| FieldValue { text: trimmed.to_string(), value: Value::String(trimmed.to_string()) })
    }
    Value::Number(number) => Some(FieldValue { text: number.to_string(), value: value.clone() }),
    _ => None,
  }
}

/// Populated fields of one submission, keyed by field key
pub type FieldValues = BTreeMap<&'static str, FieldValue>;

/// A submitted form, tagged with the schema it was detected as
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationInput {
  Materials(FieldValues),
  Mining(FieldValues),
}

impl SimulationInput {
  /// Build an input from a raw submission, ignoring unknown keys
  pub fn from_submission(submission: &Map<String, Value>) -> Self {
    Self::with_variant(SchemaVariant::detect(submission), submission)
  }

  /// Build an input for a known variant
  pub fn with_variant(variant: SchemaVariant, submission: &Map<String, Value>) -> Self {
    let values: FieldValues = variant
      .fields()
      .iter()
      .filter_map(|spec| submission.get(spec.key).and_then(field_value).map(|v| (spec.key, v)))
      .collect();

    match variant {
      SchemaVariant::Materials => SimulationInput::Materials(values),
      SchemaVariant::Mining => SimulationInput::Mining(values),
    }
  }

  pub fn variant(&self) -> SchemaVariant {
    match self {
      SimulationInput::Materials(_) => SchemaVariant::Materials,
      SimulationInput::Mining(_) => SchemaVariant::Mining,
    }
  }

  pub fn values(&self) -> &FieldValues {
    match self {
      SimulationInput::Materials(values) | SimulationInput::Mining(values) => values,
    }
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.values().get(key).map(|field| field.text.as_str())
  }

  /// Numeric view of a populated field, when it parses
  pub fn number(&self, key: &str) -> Option<f64> {
    self.get(key).and_then(|value| value.parse::<f64>().ok()).filter(|n| n.is_finite())
  }

  /// Populated fields in table order
  pub fn populated(&self) -> impl Iterator<Item = (&'static FieldSpec, &str)> + '_ {
    self
      .variant()
      .fields()
      .iter()
      .filter_map(move |spec| self.get(spec.key).map(|value| (spec, value)))
  }

  /// Persisted form: every field of the schema, `null` when not supplied.
  /// Numbers stay numbers.
  pub fn to_input_data(&self) -> Value {
    let object: Map<String, Value> = self
      .variant()
      .fields()
      .iter()
      .map(|spec| {
        let value = self.values().get(spec.key).map(|field| field.value.clone()).unwrap_or(Value::Null);
        (spec.key.to_string(), value)
      })
      .collect();
    Value::Object(object)
  }

  /// Submitted title, else the goal truncated to 100 characters, else a placeholder
  pub fn title(&self, submitted: Option<&str>) -> String {
    if let Some(title) = submitted.map(str::trim).filter(|t| !t.is_empty()) {
      return title.to_string();
    }
    match self.get("goal") {
      Some(goal) => goal.chars().take(TITLE_MAX_CHARS).collect(),
      None => UNTITLED.to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn submission(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
  }

  #[test]
  fn test_materials_submission_is_detected() {
    let input = SimulationInput::from_submission(&submission(json!({
      "goal": "test", "materialType": "metals", "composition": "Fe 100%", "conditions": "25C"
    })));

    assert_eq!(input.variant(), SchemaVariant::Materials);
    assert_eq!(input.get("materialType"), Some("metals"));
  }

  #[test]
  fn test_mining_submission_is_detected_by_mining_only_field() {
    let input = SimulationInput::from_submission(&submission(json!({
      "goal": "recovery", "pH": "1.8", "temperature": "80"
    })));

    assert_eq!(input.variant(), SchemaVariant::Mining);
    assert_eq!(input.get("pH"), Some("1.8"));
    assert_eq!(input.get("eh"), None);
  }

  #[test]
  fn test_shared_fields_alone_stay_materials() {
    let input = SimulationInput::from_submission(&submission(json!({
      "goal": "g", "composition": "Cu", "constraints": "none", "pH": "  "
    })));
    assert_eq!(input.variant(), SchemaVariant::Materials);
  }

  #[test]
  fn test_numbers_are_accepted_and_blank_values_dropped() {
    let input = SimulationInput::from_submission(&submission(json!({
      "pH": 1.5, "eh": "", "orp": null, "temperature": true, "unknown": "x"
    })));

    assert_eq!(input.get("pH"), Some("1.5"));
    assert_eq!(input.values().len(), 1);
    assert_eq!(input.number("pH"), Some(1.5));
  }

  #[test]
  fn test_input_data_has_null_for_every_missing_field() {
    let input = SimulationInput::from_submission(&submission(json!({
      "goal": "test", "materialType": "metals"
    })));
    let data = input.to_input_data();
    let object = data.as_object().unwrap();

    assert_eq!(object.len(), MATERIALS_FIELDS.len());
    assert_eq!(object["materialType"], json!("metals"));
    assert_eq!(object["application"], Value::Null);
  }

  #[test]
  fn test_input_data_keeps_submitted_numbers() {
    let input = SimulationInput::from_submission(&submission(json!({
      "pH": 1.5, "temperature": 80, "eh": " 550 ", "mineralType": "chalcopyrite"
    })));
    let data = input.to_input_data();

    assert_eq!(data["pH"], json!(1.5));
    assert_eq!(data["temperature"], json!(80));
    assert_eq!(data["eh"], json!("550"));
    assert_eq!(input.get("temperature"), Some("80"));

    let reread = SimulationInput::with_variant(SchemaVariant::Mining, data.as_object().unwrap());
    assert_eq!(reread, input);
  }

  #[test]
  fn test_title_defaults() {
    let long_goal = "g".repeat(150);
    let input = SimulationInput::from_submission(&submission(json!({ "goal": long_goal })));

    assert_eq!(input.title(Some("  My run ")), "My run");
    assert_eq!(input.title(Some("")).chars().count(), 100);

    let empty = SimulationInput::from_submission(&Map::new());
    assert_eq!(empty.title(None), UNTITLED);
  }

  #[test]
  fn test_display_value_units() {
    let temperature = MINING_FIELDS.iter().find(|f| f.key == "temperature").unwrap();
    let eh = MINING_FIELDS.iter().find(|f| f.key == "eh").unwrap();
    let percent = MINING_FIELDS.iter().find(|f| f.key == "pyritePercent").unwrap();

    assert_eq!(temperature.display_value("80"), "80°C");
    assert_eq!(eh.display_value("550"), "550 mV");
    assert_eq!(percent.display_value("25"), "25%");
  }

  #[test]
  fn test_field_keys_are_unique_per_schema() {
    for variant in [SchemaVariant::Materials, SchemaVariant::Mining] {
      let fields = variant.fields();
      for (index, spec) in fields.iter().enumerate() {
        assert!(!fields[index + 1..].iter().any(|other| other.key == spec.key), "{}", spec.key);
      }
    }
  }
}
