//! Hosted table store over the PostgREST interface
//!
//! Ownership is enforced here with `eq.` filters on `user_id`, so the
//! client authenticates with the project's service key rather than the
//! caller's session.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{RecordStore, StoreError};
use crate::record::{AccountId, NewSimulation, SimulationRecord};

pub struct HostedRecordStore {
  client: reqwest::Client,
  table_url: String,
  api_key: String,
}

#[derive(Debug, Deserialize)]
struct OwnerRow {
  user_id: AccountId,
}

impl HostedRecordStore {
  pub fn new(base_url: &str, api_key: impl Into<String>, table: &str) -> Self {
    Self {
      client: reqwest::Client::new(),
      table_url: format!("{}/rest/v1/{table}", base_url.trim_end_matches('/')),
      api_key: api_key.into(),
    }
  }

  fn request(&self, method: Method, filters: &[(&str, String)]) -> RequestBuilder {
    self
      .client
      .request(method, &self.table_url)
      .header("apikey", &self.api_key)
      .bearer_auth(&self.api_key)
      .query(filters)
  }

  fn returning(builder: RequestBuilder) -> RequestBuilder {
    builder.header("Prefer", "return=representation")
  }

  async fn rows<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, StoreError> {
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(StoreError::Status { status: status.as_u16(), body });
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| StoreError::Decode(e.to_string()))
  }
}

fn eq(value: &str) -> String {
  format!("eq.{value}")
}

/// The `id` column is a uuid; PostgREST rejects anything else with a 400,
/// so such ids match no row and never reach the table.
fn is_record_id(id: &str) -> bool {
  Uuid::parse_str(id).is_ok()
}

#[async_trait]
impl RecordStore for HostedRecordStore {
  async fn insert(&self, record: NewSimulation) -> Result<SimulationRecord, StoreError> {
    let response = Self::returning(self.request(Method::POST, &[])).json(&record).send().await?;
    Self::rows::<SimulationRecord>(response)
      .await?
      .into_iter()
      .next()
      .ok_or_else(|| StoreError::Decode("insert returned no rows".to_string()))
  }

  async fn find_owned(&self, id: &str, user_id: &str) -> Result<Option<SimulationRecord>, StoreError> {
    if !is_record_id(id) {
      return Ok(None);
    }
    let filters = [("select", "*".to_string()), ("id", eq(id)), ("user_id", eq(user_id))];
    let response = self.request(Method::GET, &filters).send().await?;
    Ok(Self::rows(response).await?.into_iter().next())
  }

  async fn find_public(&self, id: &str) -> Result<Option<SimulationRecord>, StoreError> {
    if !is_record_id(id) {
      return Ok(None);
    }
    let filters = [("select", "*".to_string()), ("id", eq(id)), ("is_public", eq("true"))];
    let response = self.request(Method::GET, &filters).send().await?;
    Ok(Self::rows(response).await?.into_iter().next())
  }

  async fn owner_of(&self, id: &str) -> Result<Option<AccountId>, StoreError> {
    if !is_record_id(id) {
      return Ok(None);
    }
    let filters = [("select", "user_id".to_string()), ("id", eq(id))];
    let response = self.request(Method::GET, &filters).send().await?;
    Ok(Self::rows::<OwnerRow>(response).await?.into_iter().next().map(|row| row.user_id))
  }

  async fn set_visibility(
    &self,
    id: &str,
    user_id: &str,
    is_public: bool,
  ) -> Result<Option<SimulationRecord>, StoreError> {
    if !is_record_id(id) {
      return Ok(None);
    }
    let filters = [("id", eq(id)), ("user_id", eq(user_id))];
    let response = Self::returning(self.request(Method::PATCH, &filters))
      .json(&json!({ "is_public": is_public }))
      .send()
      .await?;
    Ok(Self::rows(response).await?.into_iter().next())
  }

  async fn delete_owned(&self, id: &str, user_id: &str) -> Result<bool, StoreError> {
    if !is_record_id(id) {
      return Ok(false);
    }
    let filters = [("id", eq(id)), ("user_id", eq(user_id))];
    let response = Self::returning(self.request(Method::DELETE, &filters)).send().await?;
    Ok(!Self::rows::<OwnerRow>(response).await?.is_empty())
  }

  async fn list_owned(&self, user_id: &str) -> Result<Vec<SimulationRecord>, StoreError> {
    let filters =
      [("select", "*".to_string()), ("user_id", eq(user_id)), ("order", "created_at.desc".to_string())];
    let response = self.request(Method::GET, &filters).send().await?;
    Self::rows(response).await
  }

  async fn list_public(&self) -> Result<Vec<SimulationRecord>, StoreError> {
    let filters =
      [("select", "*".to_string()), ("is_public", eq("true")), ("order", "created_at.desc".to_string())];
    let response = self.request(Method::GET, &filters).send().await?;
    Self::rows(response).await
  }
}
