//! Form presets
//!
//! Each preset bulk-populates one form for a common process so a client
//! only has to adjust a few values before submitting. Mining presets fill
//! the leach/comminution form; materials presets are worked research
//! queries for the materials form.

use serde_json::{Map, Value};

use crate::schema::SchemaVariant;

#[derive(Debug, Clone, Copy)]
pub struct Preset {
  pub key: &'static str,
  pub label: &'static str,
  pub category: &'static str,
  pub variant: SchemaVariant,
  pub fields: &'static [(&'static str, &'static str)],
}

pub const PRESETS: &[Preset] = &[
  Preset {
    key: "chalcopyrite-acidic",
    label: "Chalcopyrite Leaching - Acidic",
    category: "Leaching",
    variant: SchemaVariant::Mining,
    fields: &[
      ("mineralType", "chalcopyrite"),
      ("goal", "recovery"),
      ("pH", "1.5"),
      ("eh", "550"),
      ("temperature", "75"),
      ("residenceTime", "24"),
      ("pulpDensity", "20"),
      ("acidConcentration", "50"),
      ("fe3Concentration", "3.5"),
      ("fe2Concentration", "1.2"),
      ("oxidantDosage", "0.5"),
      ("chalcopyritePercent", "45"),
      ("pyritePercent", "25"),
      ("particleSize", "150"),
      ("atmosphere", "oxidizing"),
      ("oxygenFlowRate", "0.5"),
    ],
  },
  Preset {
    key: "chalcopyrite-ferric",
    label: "Chalcopyrite Leaching - Ferric (Fe³⁺ Oxidative)",
    category: "Leaching",
    variant: SchemaVariant::Mining,
    fields: &[
      ("mineralType", "chalcopyrite"),
      ("goal", "recovery"),
      ("pH", "1.8"),
      ("eh", "580"),
      ("temperature", "85"),
      ("residenceTime", "36"),
      ("pulpDensity", "25"),
      ("acidConcentration", "40"),
      ("fe3Concentration", "5.0"),
      ("fe2Concentration", "0.8"),
      ("chalcopyritePercent", "50"),
      ("pyritePercent", "20"),
      ("particleSize", "120"),
      ("redoxControl", "Fe³⁺/Fe²⁺ ratio maintained at 6.25"),
      ("atmosphere", "oxidizing"),
    ],
  },
  Preset {
    key: "hvp-liberation",
    label: "HVP Liberation",
    category: "Comminution",
    variant: SchemaVariant::Mining,
    fields: &[
      ("goal", "liberation"),
      ("mineralType", "chalcopyrite"),
      ("voltage", "15"),
      ("pulseFrequency", "100"),
      ("pulseEnergy", "2.5"),
      ("specificEnergy", "5.0"),
      ("particleSize", "200"),
      ("grainSize", "50"),
      ("fragmentationModel", "Weibull distribution"),
      ("chalcopyritePercent", "40"),
      ("particleLiberationIndex", "0.75"),
    ],
  },
  Preset {
    key: "hvp-pretreatment-leach",
    label: "HVP Pre-Treatment + Leach",
    category: "Leaching",
    variant: SchemaVariant::Mining,
    fields: &[
      ("mineralType", "chalcopyrite"),
      ("goal", "recovery"),
      ("voltage", "18"),
      ("pulseFrequency", "120"),
      ("pulseEnergy", "3.0"),
      ("specificEnergy", "6.5"),
      ("pH", "1.6"),
      ("temperature", "70"),
      ("residenceTime", "18"),
      ("pulpDensity", "22"),
      ("acidConcentration", "45"),
      ("fe3Concentration", "3.0"),
      ("chalcopyritePercent", "42"),
      ("particleSize", "180"),
      ("particleLiberation", "90"),
      ("fragmentationModel", "Log-normal distribution"),
      ("atmosphere", "oxidizing"),
    ],
  },
  Preset {
    key: "heap-leach-copper",
    label: "Heap Leach (Copper)",
    category: "Leaching",
    variant: SchemaVariant::Mining,
    fields: &[
      ("mineralType", "chalcopyrite"),
      ("goal", "recovery"),
      ("pH", "2.0"),
      ("temperature", "25"),
      ("residenceTime", "720"),
      ("acidConcentration", "30"),
      ("chalcopyritePercent", "35"),
      ("pyritePercent", "15"),
      ("particleSize", "12.5"),
      ("solidToLiquidRatio", "0.3"),
      ("atmosphere", "oxidizing"),
      ("oxygenFlowRate", "0.2"),
      ("reagentSchedule", "Acid: 30 g/L initial, continuous addition at 0.5 g/L/day"),
    ],
  },
  Preset {
    key: "flotation-optimization",
    label: "Flotation Response Simulation",
    category: "Flotation",
    variant: SchemaVariant::Mining,
    fields: &[
      ("mineralType", "mixed-sulfides"),
      ("goal", "grade"),
      ("pH", "9.5"),
      ("temperature", "25"),
      ("pulpDensity", "30"),
      ("particleSize", "75"),
      ("chalcopyritePercent", "35"),
      ("pyritePercent", "30"),
      ("bornitePercent", "15"),
      ("particleLiberation", "85"),
      ("reagentSchedule", "Collector: Xanthate 50 g/t, Frother: MIBC 20 g/t, pH modifier: Lime"),
    ],
  },
  Preset {
    key: "ore-sorting",
    label: "Ore Sorting & Mineral Upgrading",
    category: "Comminution",
    variant: SchemaVariant::Mining,
    fields: &[
      ("goal", "grade"),
      ("mineralType", "chalcopyrite"),
      ("chalcopyritePercent", "38"),
      ("pyritePercent", "22"),
      ("particleSize", "50"),
      ("particleLiberation", "80"),
      ("grainSize", "30"),
      ("particleLiberationIndex", "0.80"),
    ],
  },
  Preset {
    key: "grain-size-reduction",
    label: "Grain Size Reduction",
    category: "Comminution",
    variant: SchemaVariant::Mining,
    fields: &[
      ("goal", "liberation"),
      ("mineralType", "chalcopyrite"),
      ("particleSize", "300"),
      ("grainSize", "80"),
      ("chalcopyritePercent", "40"),
      ("pyritePercent", "25"),
      ("particleLiberation", "60"),
      ("particleLiberationIndex", "0.60"),
      ("specificEnergy", "12"),
      ("fragmentationModel", "Bond work index model"),
    ],
  },
  // Materials research queries
  Preset {
    key: "carbon-steel-thermal-treatment",
    label: "Carbon Steel Thermal Treatment",
    category: "Metals",
    variant: SchemaVariant::Materials,
    fields: &[
      ("goal", "Analyze the thermal treatment process for improving the mechanical properties of carbon steel through quenching and tempering. The goal is to optimize temperature profiles to achieve optimal hardness and toughness balance for structural applications."),
      ("materialType", "metals"),
      ("composition", "Fe 98%, C 0.4%, Mn 0.6%, Si 0.3%, P 0.03%, S 0.02%"),
      ("conditions", "Quenching temperature: 850°C, Quenching medium: Oil, Tempering temperature: 400-600°C, Holding time: 2 hours, Cooling rate: 50°C/min"),
      ("application", "structural"),
      ("targetProperties", "Hardness: 40-50 HRC, Tensile strength: >600 MPa, Toughness: >50 J/cm²"),
      ("processingMethod", "heat-treatment"),
      ("priority", "performance"),
      ("constraints", "Processing time: <4 hours, Maximum temperature: 900°C"),
    ],
  },
  Preset {
    key: "stainless-steel-corrosion",
    label: "Stainless Steel Corrosion Resistance",
    category: "Metals",
    variant: SchemaVariant::Materials,
    fields: &[
      ("goal", "Investigate the corrosion resistance of stainless steel in marine environments. Evaluate the effect of chromium and nickel content on pitting corrosion resistance and passive film formation."),
      ("materialType", "metals"),
      ("composition", "Fe 70%, Cr 18%, Ni 8%, Mo 3%, C 0.08%, Mn 1%, Si 0.5%"),
      ("conditions", "Temperature: 25°C, Pressure: 1 atm, Environment: 3.5% NaCl solution, pH: 7-8, Exposure time: 1000 hours, Electrochemical potential: +0.3V vs SCE"),
      ("application", "marine"),
      ("targetProperties", "Pitting potential: >0.4V, Corrosion rate: <0.01 mm/year"),
      ("priority", "durability"),
    ],
  },
  Preset {
    key: "hdpe-mechanical-properties",
    label: "Polyethylene Mechanical Properties",
    category: "Polymers",
    variant: SchemaVariant::Materials,
    fields: &[
      ("goal", "Optimize the mechanical properties of high-density polyethylene (HDPE) by analyzing the effects of molecular weight distribution and processing conditions on tensile strength and impact resistance."),
      ("materialType", "polymers"),
      ("composition", "HDPE (High-Density Polyethylene): 95%, Additives (UV stabilizers, antioxidants): 3%, Impact modifiers: 2%"),
      ("conditions", "Processing temperature: 200-220°C, Injection pressure: 80-100 MPa, Cooling rate: 10°C/min, Mold temperature: 40°C, Holding pressure: 50 MPa, Crystallization temperature: 120°C"),
      ("application", "automotive"),
      ("targetProperties", "Tensile strength: >25 MPa, Impact strength: >15 kJ/m², Elongation at break: >500%"),
      ("processingMethod", "injection-molding"),
      ("priority", "performance"),
      ("constraints", "Cycle time: <60 seconds, Material cost: <$2/kg"),
    ],
  },
  Preset {
    key: "alumina-sintering",
    label: "Alumina Sintering",
    category: "Ceramics",
    variant: SchemaVariant::Materials,
    fields: &[
      ("goal", "Optimize the sintering process for alumina ceramics to achieve maximum density and mechanical strength. Analyze the effect of sintering temperature, time, and heating rate on microstructure and properties."),
      ("materialType", "ceramics"),
      ("composition", "Al2O3: 99.5%, MgO sintering aid: 0.5%, Particle size: D50 = 0.5 μm"),
      ("conditions", "Sintering temperature: 1600-1700°C, Sintering time: 2-4 hours, Heating rate: 5°C/min, Cooling rate: 10°C/min, Atmosphere: Air, Green density: 55% theoretical"),
      ("application", "high-temperature"),
      ("targetProperties", "Density: >99% theoretical, Flexural strength: >400 MPa, Operating temperature: up to 1600°C"),
      ("processingMethod", "sintering"),
      ("priority", "performance"),
      ("constraints", "Maximum sintering temperature: 1750°C, Processing time: <6 hours"),
    ],
  },
  Preset {
    key: "carbon-fiber-composite",
    label: "Carbon Fiber Composite",
    category: "Composites",
    variant: SchemaVariant::Materials,
    fields: &[
      ("goal", "Optimize the processing parameters for carbon fiber reinforced polymer (CFRP) composites to maximize interlaminar shear strength and reduce void content."),
      ("materialType", "composites"),
      ("composition", "Epoxy resin matrix: 40%, Carbon fiber (T300): 60%, Fiber orientation: [0/90]₂s, Fiber volume fraction: 0.6"),
      ("conditions", "Curing temperature: 180°C, Curing pressure: 0.6 MPa, Curing time: 2 hours, Post-curing: 200°C for 1 hour, Vacuum level: 0.1 atm, Heating rate: 2°C/min"),
      ("application", "aerospace"),
      ("targetProperties", "Interlaminar shear strength: >60 MPa, Void content: <1%, Flexural modulus: >70 GPa"),
      ("priority", "quality"),
      ("constraints", "Processing temperature: <220°C, Part size: <500mm"),
    ],
  },
  Preset {
    key: "nanocrystalline-titanium",
    label: "Nanocrystalline Titanium",
    category: "Nanomaterials",
    variant: SchemaVariant::Materials,
    fields: &[
      ("goal", "Study the grain size refinement and mechanical properties of nanocrystalline titanium produced through severe plastic deformation. Analyze the relationship between grain size and yield strength."),
      ("materialType", "nanomaterials"),
      ("composition", "Pure Ti (Grade 2): 99.9%, Average grain size target: < 100 nm, Oxygen content: < 0.15%, Nitrogen: < 0.05%"),
      ("conditions", "Processing method: ECAP, Processing temperature: 400°C, Number of passes: 8, Total accumulated strain: ~8, Strain rate: 10⁻² s⁻¹"),
      ("application", "biomedical"),
      ("targetProperties", "Grain size: <100 nm, Yield strength: >800 MPa, Biocompatibility: excellent"),
      ("priority", "performance"),
      ("constraints", "Processing temperature: <500°C, Material purity: >99.9%"),
    ],
  },
];

pub fn find(key: &str) -> Option<&'static Preset> {
  PRESETS.iter().find(|preset| preset.key == key)
}

impl Preset {
  /// Full form for this preset's schema; untouched fields are empty strings.
  /// Mining forms record the preset in `template`, materials forms carry the
  /// label as the run title.
  pub fn to_submission(&self) -> Map<String, Value> {
    let mut form: Map<String, Value> =
      self.variant.fields().iter().map(|spec| (spec.key.to_string(), Value::String(String::new()))).collect();

    for (key, value) in self.fields {
      form.insert(key.to_string(), Value::String(value.to_string()));
    }
    match self.variant {
      SchemaVariant::Mining => form.insert("template".to_string(), Value::String(self.key.to_string())),
      SchemaVariant::Materials => form.insert("title".to_string(), Value::String(self.label.to_string())),
    };
    form
  }
}
