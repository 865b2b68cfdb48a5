//! Model response normalization
//!
//! A model answer that parses as a JSON object is stored exactly as
//! returned. Anything else (prose, truncated JSON, provider error text, an
//! empty answer, a bare JSON scalar) is replaced with a fallback object of
//! the documented shape so every chart branch has data to draw. The raw
//! text is kept as the process summary.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

use crate::schema::{SchemaVariant, SimulationInput};

pub const FALLBACK_SUMMARY: &str =
  "The model response could not be parsed as structured data; representative placeholder series are shown.";
pub const FALLBACK_METHOD: &str = "See report";

const MATERIALS_POINTS: usize = 5;
const MINING_POINTS: usize = 10;
const MATERIALS_CONFIDENCE: f64 = 0.8;
const MINING_CONFIDENCE: f64 = 0.75;

const DEFAULT_RESIDENCE_HOURS: f64 = 24.0;
const DEFAULT_PH: f64 = 1.8;
const DEFAULT_EH_MV: f64 = 550.0;
const DEFAULT_RATE_CONSTANT: f64 = 0.05;
const DEFAULT_REACTION_ORDER: f64 = 1.0;
const DEFAULT_ACTIVATION_ENERGY: f64 = 75.0;

// Submitted values are clamped into these ranges before they seed a series
const MAX_RESIDENCE_HOURS: f64 = 100_000.0;
const PH_RANGE: (f64, f64) = (0.0, 14.0);
const EH_RANGE_MV: (f64, f64) = (-2_000.0, 2_000.0);
const REACTION_ORDER_RANGE: (f64, f64) = (0.0, 10.0);
const ACTIVATION_ENERGY_RANGE: (f64, f64) = (0.0, 1_000.0);

/// Outcome of normalizing one model answer
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
  Parsed(Value),
  Fallback(Value),
}

impl Normalized {
  pub fn is_fallback(&self) -> bool {
    matches!(self, Normalized::Fallback(_))
  }

  pub fn into_value(self) -> Value {
    match self {
      Normalized::Parsed(value) | Normalized::Fallback(value) => value,
    }
  }
}

/// Normalizer with an injectable jitter source
pub struct Normalizer {
  rng: StdRng,
}

impl Normalizer {
  /// Deterministic fallback series
  pub fn seeded(seed: u64) -> Self {
    Self { rng: StdRng::seed_from_u64(seed) }
  }

  pub fn from_entropy() -> Self {
    Self { rng: StdRng::from_entropy() }
  }

  pub fn normalize(&mut self, raw: &str, input: &SimulationInput) -> Normalized {
    match serde_json::from_str::<Value>(raw) {
      Ok(value @ Value::Object(_)) => Normalized::Parsed(value),
      _ => Normalized::Fallback(self.fallback(raw, input)),
    }
  }

  /// Placeholder result shaped for the input's schema
  pub fn fallback(&mut self, raw: &str, input: &SimulationInput) -> Value {
    let summary = match raw.trim() {
      "" => FALLBACK_SUMMARY.to_string(),
      _ => raw.to_string(),
    };

    match input.variant() {
      SchemaVariant::Materials => self.materials_fallback(summary),
      SchemaVariant::Mining => self.mining_fallback(summary, input),
    }
  }

  fn jitter(&mut self, amplitude: f64) -> f64 {
    self.rng.gen_range(-amplitude..=amplitude)
  }

  fn materials_fallback(&mut self, summary: String) -> Value {
    let mut temperature_data = Vec::with_capacity(MATERIALS_POINTS);
    let mut material_properties = Vec::with_capacity(MATERIALS_POINTS);

    for index in 0..MATERIALS_POINTS {
      let t = fraction(index, MATERIALS_POINTS);
      let temperature = 100.0 + 100.0 * index as f64;

      let efficiency = (lerp(0.5, 0.92, t) + self.jitter(0.02)).clamp(0.0, 1.0);
      temperature_data.push(json!({
        "temperature": temperature,
        "efficiency": round(efficiency, 3),
      }));

      let hardness = lerp(30.0, 50.0, t) + self.jitter(1.0);
      let strength = lerp(400.0, 600.0, t) + self.jitter(10.0);
      let conductivity = lerp(50.0, 90.0, t) + self.jitter(2.0);
      material_properties.push(json!({
        "temperature": temperature,
        "hardness": round(hardness, 2),
        "strength": round(strength, 2),
        "conductivity": round(conductivity, 2),
      }));
    }

    json!({
      "processSummary": summary,
      "recommendedMethod": FALLBACK_METHOD,
      "temperatureData": temperature_data,
      "materialPropertiesData": material_properties,
      "confidenceScore": MATERIALS_CONFIDENCE,
      "predictions": {},
    })
  }

  fn mining_fallback(&mut self, summary: String, input: &SimulationInput) -> Value {
    let duration = input
      .number("residenceTime")
      .filter(|hours| *hours > 0.0)
      .map_or(DEFAULT_RESIDENCE_HOURS, |hours| hours.min(MAX_RESIDENCE_HOURS));
    let base_ph = bounded(input, "pH", PH_RANGE, DEFAULT_PH);
    let base_eh = bounded(input, "eh", EH_RANGE_MV, DEFAULT_EH_MV);

    let mut recovery = Vec::with_capacity(MINING_POINTS);
    let mut ph = Vec::with_capacity(MINING_POINTS);
    let mut eh = Vec::with_capacity(MINING_POINTS);
    let mut ratio = Vec::with_capacity(MINING_POINTS);

    for index in 0..MINING_POINTS {
      let t = fraction(index, MINING_POINTS);
      let time = round(duration * t, 2);

      let recovered = (lerp(0.0, 85.0, t) + self.jitter(1.5)).clamp(0.0, 100.0);
      recovery.push(json!({ "time": time, "recovery": round(recovered, 2) }));

      let ph_value = (base_ph + lerp(0.0, 0.3, t) + self.jitter(0.05)).max(0.0);
      ph.push(json!({ "time": time, "pH": round(ph_value, 2) }));

      let eh_value = base_eh - lerp(0.0, 40.0, t) + self.jitter(5.0);
      eh.push(json!({ "time": time, "eh": round(eh_value, 1) }));

      let ratio_value = (lerp(4.0, 2.5, t) + self.jitter(0.1)).max(0.0);
      ratio.push(json!({ "time": time, "ratio": round(ratio_value, 2) }));
    }

    let rate_constant = DEFAULT_RATE_CONSTANT;
    json!({
      "processSummary": summary,
      "recommendedMethod": FALLBACK_METHOD,
      "recoveryData": recovery,
      "chemistryProfiles": {
        "pH": ph,
        "eh": eh,
        "fe3Fe2Ratio": ratio,
      },
      "kineticsAnalysis": {
        "rateConstant": rate_constant,
        "reactionOrder": bounded(input, "reactionOrder", REACTION_ORDER_RANGE, DEFAULT_REACTION_ORDER),
        "activationEnergy": bounded(input, "activationEnergy", ACTIVATION_ENERGY_RANGE, DEFAULT_ACTIVATION_ENERGY),
        "halfLife": round(std::f64::consts::LN_2 / rate_constant, 2),
      },
      "confidenceScore": MINING_CONFIDENCE,
      "predictions": {},
    })
  }
}

fn bounded(input: &SimulationInput, key: &str, (min, max): (f64, f64), default: f64) -> f64 {
  input.number(key).map_or(default, |value| value.clamp(min, max))
}

fn fraction(index: usize, points: usize) -> f64 {
  index as f64 / (points - 1) as f64
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
  from + (to - from) * t
}

fn round(value: f64, places: i32) -> f64 {
  let factor = 10f64.powi(places);
  (value * factor).round() / factor
}
