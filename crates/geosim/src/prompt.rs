//! Prompt assembly
//!
//! Turns a submitted form into the user message sent to the model. The
//! parameter block is a direct transcription of the schema's field table,
//! so identical inputs always produce identical prompts. Values are
//! interpolated verbatim.

use crate::schema::{SchemaVariant, Section, SimulationInput};

pub const SYSTEM_INSTRUCTION: &str = "You are a scientific simulation expert. Provide detailed, \
accurate technical reports with numerical data for visualization.";

const MATERIALS_PREAMBLE: &str = "Given the following research objective and parameters, \
generate a comprehensive technical simulation report including:

- Detailed process summary
- Recommended method with justification
- Predicted temperature/efficiency data (provide at least 5-7 numerical data points for visualization)
- Material properties over temperature (hardness, strength, conductivity - at least 5-7 data points)
- Target property predictions based on input parameters
- Optimization recommendations
- Confidence score (0-1)";

const MATERIALS_RESPONSE_FORMAT: &str = r#"Please format the response as JSON with the following structure:
{
  "processSummary": "Detailed summary of the simulation process and key findings...",
  "recommendedMethod": "Recommended processing/experimental method with reasoning...",
  "temperatureData": [{"temperature": number, "efficiency": number}, ...],
  "materialPropertiesData": [{"temperature": number, "hardness": number, "strength": number, "conductivity": number}, ...],
  "confidenceScore": number (0-1),
  "predictions": {
    "predictedProperties": {...},
    "optimizationTips": [...]
  }
}"#;

const MINING_PREAMBLE: &str = "Given the following mineral processing objective and \
process parameters, generate a comprehensive hydrometallurgical simulation report including:

- Detailed process summary covering dissolution behaviour and key findings
- Recommended process route with justification
- Metal recovery over time (provide 8-10 numerical data points for visualization)
- Solution chemistry profiles over time: pH, redox potential in mV and ferric/ferrous ratio
- Kinetics analysis (rate constant, reaction order, activation energy, half-life)
- Optimization recommendations
- Confidence score (0-1)";

const MINING_RESPONSE_FORMAT: &str = r#"Please format the response as JSON with the following structure:
{
  "processSummary": "Detailed summary of the simulated process and key findings...",
  "recommendedMethod": "Recommended process route with reasoning...",
  "recoveryData": [{"time": number, "recovery": number, "grade": number}, ...],
  "chemistryProfiles": {
    "pH": [{"time": number, "pH": number}, ...],
    "eh": [{"time": number, "eh": number}, ...],
    "fe3Fe2Ratio": [{"time": number, "ratio": number}, ...]
  },
  "kineticsAnalysis": {"rateConstant": number, "reactionOrder": number, "activationEnergy": number, "halfLife": number},
  "confidenceScore": number (0-1),
  "predictions": {
    "predictedRecovery": number,
    "optimizationTips": [...]
  }
}"#;

/// Parameter block: a heading per populated section and one line per populated field
pub fn assemble_parameters(input: &SimulationInput) -> String {
  let mut lines = Vec::new();
  let mut current: Option<Section> = None;

  for (spec, value) in input.populated() {
    if current != Some(spec.section) {
      if current.is_some() {
        lines.push(String::new());
      }
      lines.push(format!("{}:", spec.section.heading()));
      current = Some(spec.section);
    }
    lines.push(format!("- {}: {}", spec.label, spec.display_value(value)));
  }

  lines.join("\n")
}

/// Full user message: preamble, parameter block and response format
pub fn assemble_prompt(input: &SimulationInput) -> String {
  let (preamble, response_format) = match input.variant() {
    SchemaVariant::Materials => (MATERIALS_PREAMBLE, MATERIALS_RESPONSE_FORMAT),
    SchemaVariant::Mining => (MINING_PREAMBLE, MINING_RESPONSE_FORMAT),
  };

  format!("{preamble}\n\n{}\n\n{response_format}", assemble_parameters(input))
}
