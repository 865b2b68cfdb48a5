//! Record store abstraction
//!
//! Every owner-scoped operation filters on record id AND account id in the
//! same query, and every public read filters on `is_public = true`. The
//! two implementations are an in-memory map for tests and local runs and a
//! PostgREST client for the hosted table.

use async_trait::async_trait;
use thiserror::Error;

use crate::record::{AccountId, NewSimulation, SimulationRecord};

pub mod hosted;
pub mod memory;

pub use hosted::HostedRecordStore;
pub use memory::MemoryRecordStore;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Store request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("Store returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("Malformed store response: {0}")]
  Decode(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
  /// Insert a record; the store generates `id` and `created_at`
  async fn insert(&self, record: NewSimulation) -> Result<SimulationRecord, StoreError>;

  /// Read filtered by id and owner
  async fn find_owned(&self, id: &str, user_id: &str) -> Result<Option<SimulationRecord>, StoreError>;

  /// Read filtered by id and `is_public = true`
  async fn find_public(&self, id: &str) -> Result<Option<SimulationRecord>, StoreError>;

  /// Owner of a record, if it exists
  async fn owner_of(&self, id: &str) -> Result<Option<AccountId>, StoreError>;

  /// Update visibility filtered by id and owner; `None` when nothing matched
  async fn set_visibility(
    &self,
    id: &str,
    user_id: &str,
    is_public: bool,
  ) -> Result<Option<SimulationRecord>, StoreError>;

  /// Delete filtered by id and owner; `false` when nothing matched
  async fn delete_owned(&self, id: &str, user_id: &str) -> Result<bool, StoreError>;

  /// All records of one account, newest first
  async fn list_owned(&self, user_id: &str) -> Result<Vec<SimulationRecord>, StoreError>;

  /// All public records, newest first
  async fn list_public(&self) -> Result<Vec<SimulationRecord>, StoreError>;
}
