//! Sessions and account lookups
//!
//! Authentication lives in the hosted auth service. The server only asks
//! two questions of it: who is behind this request's bearer token, and
//! what is the display profile of an account id.

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::record::AccountId;

#[derive(Debug, Error)]
pub enum SessionError {
  #[error("Auth request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("Auth service returned {status}: {body}")]
  Status { status: u16, body: String },
}

/// Signed-in account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Account {
  pub id: AccountId,
  #[serde(default)]
  pub email: Option<String>,
}

impl Account {
  pub fn new(id: impl Into<AccountId>) -> Self {
    Self { id: id.into(), email: None }
  }
}

/// Credentials carried by one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
  pub bearer: Option<String>,
}

impl Credentials {
  pub fn bearer(token: impl Into<String>) -> Self {
    Self { bearer: Some(token.into()) }
  }

  pub fn from_headers(headers: &HeaderMap) -> Self {
    let bearer = headers
      .get(AUTHORIZATION)
      .and_then(|value| value.to_str().ok())
      .and_then(|value| value.strip_prefix("Bearer "))
      .map(str::trim)
      .filter(|token| !token.is_empty())
      .map(str::to_string);
    Self { bearer }
  }
}

#[async_trait]
pub trait SessionProvider: Send + Sync {
  /// Account behind the credentials, `None` when there is no valid session
  async fn current_user(&self, credentials: &Credentials) -> Result<Option<Account>, SessionError>;
}

/// Display profile used for attribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AccountProfile {
  pub email: String,
  #[serde(default)]
  pub user_metadata: Value,
}

impl AccountProfile {
  /// Generic attribution used when the lookup is unavailable
  pub fn placeholder() -> Self {
    Self { email: "User".to_string(), user_metadata: Value::Object(Map::new()) }
  }
}

#[async_trait]
pub trait AccountDirectory: Send + Sync {
  async fn lookup(&self, user_id: &str) -> Result<Option<AccountProfile>, SessionError>;
}

/// Best-effort profile: falls back to the placeholder instead of failing
pub async fn resolve_profile(directory: Option<&dyn AccountDirectory>, user_id: &str) -> AccountProfile {
  let Some(directory) = directory else {
    return AccountProfile::placeholder();
  };

  match directory.lookup(user_id).await {
    Ok(Some(profile)) => profile,
    Ok(None) => AccountProfile::placeholder(),
    Err(e) => {
      tracing::warn!(user_id, error = %e, "Account lookup failed, using placeholder profile");
      AccountProfile::placeholder()
    }
  }
}

// Hosted Auth
// ===========

#[derive(Debug, Deserialize)]
struct AuthUser {
  id: AccountId,
  #[serde(default)]
  email: Option<String>,
  #[serde(default)]
  user_metadata: Option<Value>,
}

async fn auth_user(response: reqwest::Response) -> Result<Option<AuthUser>, SessionError> {
  let status = response.status();
  if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND) {
    return Ok(None);
  }
  if !status.is_success() {
    let body = response.text().await.unwrap_or_default();
    return Err(SessionError::Status { status: status.as_u16(), body });
  }
  Ok(Some(response.json().await?))
}

pub struct HostedSessionProvider {
  client: reqwest::Client,
  user_url: String,
  anon_key: String,
}

impl HostedSessionProvider {
  pub fn new(base_url: &str, anon_key: impl Into<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      user_url: format!("{}/auth/v1/user", base_url.trim_end_matches('/')),
      anon_key: anon_key.into(),
    }
  }
}

#[async_trait]
impl SessionProvider for HostedSessionProvider {
  async fn current_user(&self, credentials: &Credentials) -> Result<Option<Account>, SessionError> {
    let Some(token) = credentials.bearer.as_deref() else {
      return Ok(None);
    };

    let response =
      self.client.get(&self.user_url).header("apikey", &self.anon_key).bearer_auth(token).send().await?;

    Ok(auth_user(response).await?.map(|user| Account { id: user.id, email: user.email }))
  }
}

pub struct HostedAccountDirectory {
  client: reqwest::Client,
  admin_url: String,
  service_role_key: String,
}

impl HostedAccountDirectory {
  pub fn new(base_url: &str, service_role_key: impl Into<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      admin_url: format!("{}/auth/v1/admin/users", base_url.trim_end_matches('/')),
      service_role_key: service_role_key.into(),
    }
  }

  /// Admin URL for one account; only uuids are accepted, so the id can
  /// never add path segments or a query to the privileged request
  fn profile_url(&self, user_id: &str) -> Option<String> {
    let id = Uuid::parse_str(user_id).ok()?;
    Some(format!("{}/{}", self.admin_url, id.hyphenated()))
  }
}

#[async_trait]
impl AccountDirectory for HostedAccountDirectory {
  async fn lookup(&self, user_id: &str) -> Result<Option<AccountProfile>, SessionError> {
    let Some(url) = self.profile_url(user_id) else {
      tracing::debug!(user_id, "Not an account id, skipping lookup");
      return Ok(None);
    };

    let response = self
      .client
      .get(url)
      .header("apikey", &self.service_role_key)
      .bearer_auth(&self.service_role_key)
      .send()
      .await?;

    Ok(auth_user(response).await?.map(|user| AccountProfile {
      email: user.email.unwrap_or_else(|| "Unknown".to_string()),
      user_metadata: user.user_metadata.unwrap_or_else(|| Value::Object(Map::new())),
    }))
  }
}

// Static Providers
// ================

/// Fixed token → account table, for tests and local development
#[derive(Debug, Clone, Default)]
pub struct StaticSessionProvider {
  sessions: HashMap<String, Account>,
}

impl StaticSessionProvider {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_session(mut self, token: impl Into<String>, account: Account) -> Self {
    self.sessions.insert(token.into(), account);
    self
  }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
  async fn current_user(&self, credentials: &Credentials) -> Result<Option<Account>, SessionError> {
    Ok(credentials.bearer.as_deref().and_then(|token| self.sessions.get(token)).cloned())
  }
}

#[derive(Debug, Clone, Default)]
pub struct StaticAccountDirectory {
  profiles: HashMap<AccountId, AccountProfile>,
}

impl StaticAccountDirectory {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_profile(mut self, user_id: impl Into<AccountId>, profile: AccountProfile) -> Self {
    self.profiles.insert(user_id.into(), profile);
    self
  }
}

#[async_trait]
impl AccountDirectory for StaticAccountDirectory {
  async fn lookup(&self, user_id: &str) -> Result<Option<AccountProfile>, SessionError> {
    Ok(self.profiles.get(user_id).cloned())
  }
}
