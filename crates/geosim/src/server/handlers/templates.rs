//! Preset catalogue endpoints

use axum::{
  extract::{Path, Query},
  response::Json,
};

use crate::error::ApiError;
use crate::server::types::{TemplateDetail, TemplateSummary, TemplatesQuery};
use crate::templates::{self, Preset, PRESETS};

fn summary(preset: &Preset) -> TemplateSummary {
  TemplateSummary {
    key: preset.key.to_string(),
    label: preset.label.to_string(),
    category: preset.category.to_string(),
    schema: preset.variant,
  }
}

/// GET /templates - Mining presets and materials examples, optionally for one form
pub async fn list(Query(query): Query<TemplatesQuery>) -> Json<Vec<TemplateSummary>> {
  Json(
    PRESETS
      .iter()
      .filter(|preset| query.schema.map_or(true, |schema| preset.variant == schema))
      .map(summary)
      .collect(),
  )
}

/// GET /templates/{key} - The populated form for one preset
pub async fn get(Path(key): Path<String>) -> Result<Json<TemplateDetail>, ApiError> {
  let preset = templates::find(&key).ok_or_else(|| ApiError::not_found(format!("Unknown template '{key}'")))?;
  let TemplateSummary { key, label, category, schema } = summary(preset);
  Ok(Json(TemplateDetail { key, label, category, schema, fields: preset.to_submission() }))
}
