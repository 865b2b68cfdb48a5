//! Submission pipeline: form → prompt → model → normalized result → record

use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::model::{CompletionRequest, LanguageModel, ModelError};
use crate::normalizer::Normalizer;
use crate::prompt::{assemble_prompt, SYSTEM_INSTRUCTION};
use crate::record::{NewSimulation, SimulationRecord};
use crate::schema::SimulationInput;
use crate::session::Account;
use crate::store::{RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum LifecycleError {
  #[error("Model invocation failed: {0}")]
  Model(#[from] ModelError),

  #[error("Failed to store simulation: {0}")]
  Store(#[from] StoreError),
}

pub struct SimulationService {
  model: Arc<dyn LanguageModel>,
  store: Arc<dyn RecordStore>,
  normalizer: Mutex<Normalizer>,
}

impl SimulationService {
  pub fn new(model: Arc<dyn LanguageModel>, store: Arc<dyn RecordStore>, normalizer: Normalizer) -> Self {
    Self { model, store, normalizer: Mutex::new(normalizer) }
  }

  /// Run one submission to a stored, private record
  pub async fn run(&self, account: &Account, submission: &Map<String, Value>) -> Result<SimulationRecord, LifecycleError> {
    let input = SimulationInput::from_submission(submission);
    let title = input.title(submission.get("title").and_then(Value::as_str));
    tracing::debug!(variant = ?input.variant(), fields = input.values().len(), "Assembling prompt");

    let request = CompletionRequest::new(SYSTEM_INSTRUCTION, assemble_prompt(&input));
    let raw = self.model.complete(&request).await?;

    let normalized = self.normalizer.lock().await.normalize(&raw, &input);
    if normalized.is_fallback() {
      tracing::warn!(chars = raw.len(), "Model answer was not a JSON object, stored fallback result");
    }

    let record = NewSimulation {
      user_id: account.id.clone(),
      title,
      input_data: input.to_input_data(),
      ai_result: normalized.into_value(),
      is_public: false,
    };
    Ok(self.store.insert(record).await?)
  }
}
