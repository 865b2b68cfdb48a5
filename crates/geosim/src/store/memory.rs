//! In-memory record store

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RecordStore, StoreError};
use crate::record::{AccountId, NewSimulation, SimulationRecord};

#[derive(Default)]
pub struct MemoryRecordStore {
  records: RwLock<HashMap<String, SimulationRecord>>,
}

impl MemoryRecordStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Seed the store with existing rows
  pub fn with_records(records: impl IntoIterator<Item = SimulationRecord>) -> Self {
    let records = records.into_iter().map(|record| (record.id.clone(), record)).collect();
    Self { records: RwLock::new(records) }
  }

  pub async fn len(&self) -> usize {
    self.records.read().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.records.read().await.is_empty()
  }
}

fn newest_first(mut records: Vec<SimulationRecord>) -> Vec<SimulationRecord> {
  records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
  records
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
  async fn insert(&self, record: NewSimulation) -> Result<SimulationRecord, StoreError> {
    let stored = SimulationRecord {
      id: Uuid::new_v4().to_string(),
      user_id: record.user_id,
      title: Some(record.title),
      input_data: record.input_data,
      ai_result: record.ai_result,
      is_public: Some(record.is_public),
      created_at: Utc::now(),
      tags: None,
    };

    self.records.write().await.insert(stored.id.clone(), stored.clone());
    Ok(stored)
  }

  async fn find_owned(&self, id: &str, user_id: &str) -> Result<Option<SimulationRecord>, StoreError> {
    let records = self.records.read().await;
    Ok(records.get(id).filter(|record| record.user_id == user_id).cloned())
  }

  async fn find_public(&self, id: &str) -> Result<Option<SimulationRecord>, StoreError> {
    let records = self.records.read().await;
    Ok(records.get(id).filter(|record| record.is_public == Some(true)).cloned())
  }

  async fn owner_of(&self, id: &str) -> Result<Option<AccountId>, StoreError> {
    Ok(self.records.read().await.get(id).map(|record| record.user_id.clone()))
  }

  async fn set_visibility(
    &self,
    id: &str,
    user_id: &str,
    is_public: bool,
  ) -> Result<Option<SimulationRecord>, StoreError> {
    let mut records = self.records.write().await;
    Ok(records.get_mut(id).filter(|record| record.user_id == user_id).map(|record| {
      record.is_public = Some(is_public);
      record.clone()
    }))
  }

  async fn delete_owned(&self, id: &str, user_id: &str) -> Result<bool, StoreError> {
    let mut records = self.records.write().await;
    let owned = records.get(id).is_some_and(|record| record.user_id == user_id);
    Ok(owned && records.remove(id).is_some())
  }

  async fn list_owned(&self, user_id: &str) -> Result<Vec<SimulationRecord>, StoreError> {
    let records = self.records.read().await;
    Ok(newest_first(records.values().filter(|record| record.user_id == user_id).cloned().collect()))
  }

  async fn list_public(&self) -> Result<Vec<SimulationRecord>, StoreError> {
    let records = self.records.read().await;
    Ok(newest_first(records.values().filter(|record| record.is_public == Some(true)).cloned().collect()))
  }
}
