//! Router-level tests against the in-memory backend

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

use geosim::activity::ActivityLog;
use geosim::lifecycle::SimulationService;
use geosim::model::{CompletionRequest, LanguageModel, ModelError};
use geosim::normalizer::Normalizer;
use geosim::record::SimulationRecord;
use geosim::server::{create_router, AppState};
use geosim::session::{Account, AccountDirectory, AccountProfile, StaticAccountDirectory, StaticSessionProvider};
use geosim::store::{MemoryRecordStore, RecordStore};

const ALICE: &str = "alice-token";
const BOB: &str = "bob-token";

// Helpers
// =======

/// Model that answers every prompt with the same text and keeps the prompts
struct ScriptedModel {
  answer: String,
  prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
  fn new(answer: &str) -> Self {
    Self { answer: answer.to_string(), prompts: Mutex::new(Vec::new()) }
  }

  fn last_prompt(&self) -> String {
    self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
  }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
  async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError> {
    self.prompts.lock().unwrap().push(request.prompt.clone());
    Ok(self.answer.clone())
  }
}

struct Harness {
  app: Router,
  model: Arc<ScriptedModel>,
  store: Arc<MemoryRecordStore>,
  _dir: TempDir,
}

fn harness_with(answer: &str, store: MemoryRecordStore, directory: Option<Arc<dyn AccountDirectory>>) -> Harness {
  let dir = TempDir::new().unwrap();
  let activity = ActivityLog::open(dir.path().join("activity.jsonl")).unwrap();

  let model = Arc::new(ScriptedModel::new(answer));
  let store = Arc::new(store);
  let sessions = StaticSessionProvider::new()
    .with_session(ALICE, Account::new("alice"))
    .with_session(BOB, Account::new("bob"));

  let simulations = Arc::new(SimulationService::new(model.clone(), store.clone(), Normalizer::seeded(7)));
  let state = AppState { sessions: Arc::new(sessions), store: store.clone(), directory, simulations, activity };

  Harness { app: create_router(state), model, store, _dir: dir }
}

fn harness(answer: &str) -> Harness {
  harness_with(answer, MemoryRecordStore::new(), None)
}

struct Reply {
  status: StatusCode,
  request_id: Option<String>,
  content_type: Option<String>,
  body: Value,
}

async fn send_raw(
  app: &Router,
  method: Method,
  uri: &str,
  token: Option<&str>,
  content_type: Option<&str>,
  body: Body,
) -> Reply {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(token) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  if let Some(content_type) = content_type {
    builder = builder.header(header::CONTENT_TYPE, content_type);
  }

  let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = response.status();
  let header_text = |name: &str| response.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
  let request_id = header_text("x-request-id");
  let content_type = header_text(header::CONTENT_TYPE.as_str());
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };

  Reply { status, request_id, content_type, body }
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
  match body {
    Some(body) => send_raw(app, method, uri, token, Some("application/json"), Body::from(body.to_string())).await,
    None => send_raw(app, method, uri, token, None, Body::empty()).await,
  }
}

async fn submit(app: &Router, token: &str, form: Value) -> String {
  let reply = send(app, Method::POST, "/simulate", Some(token), Some(form)).await;
  assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
  reply.body["id"].as_str().unwrap().to_string()
}

async fn set_public(app: &Router, token: &str, id: &str, is_public: bool) -> Reply {
  send(app, Method::PATCH, &format!("/simulations/{id}"), Some(token), Some(json!({ "is_public": is_public }))).await
}

const VALID_ANSWER: &str = r#"{
  "processSummary": "Precipitation hardening at 480 °C",
  "recommendedMethod": "Solution treat then age",
  "temperatureData": [{"temperature": 400, "efficiency": 0.7}, {"temperature": 480, "efficiency": 0.88}],
  "confidenceScore": 0.82
}"#;

// Authentication
// ==============

#[tokio::test]
async fn test_requests_without_session_are_rejected() {
  let h = harness(VALID_ANSWER);

  for (method, uri) in [
    (Method::GET, "/simulations"),
    (Method::GET, "/simulations/anything"),
    (Method::DELETE, "/simulations/anything"),
    (Method::GET, "/public/simulations"),
    (Method::GET, "/dashboard"),
    (Method::GET, "/users/alice"),
  ] {
    let reply = send(&h.app, method, uri, None, None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{uri}");
    assert_eq!(reply.body["error"], "Unauthorized");
  }

  let reply = send(&h.app, Method::POST, "/simulate", Some("stale-token"), Some(json!({ "goal": "x" }))).await;
  assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
  assert!(h.store.is_empty().await);
  assert_eq!(h.model.prompts.lock().unwrap().len(), 0);
}

#[tokio::test]
async fn test_every_response_carries_request_id() {
  let h = harness(VALID_ANSWER);
  let ok = send(&h.app, Method::GET, "/status", None, None).await;
  let denied = send(&h.app, Method::GET, "/dashboard", None, None).await;

  assert_eq!(ok.body["status"], "healthy");
  assert!(ok.request_id.is_some());
  assert!(denied.request_id.is_some());
  assert_ne!(ok.request_id, denied.request_id);
}

// Submission
// ==========

#[tokio::test]
async fn test_materials_submission_is_stored_for_owner() {
  let h = harness(VALID_ANSWER);
  let id = submit(&h.app, ALICE, json!({ "goal": "Harden aluminium alloy", "materialType": "metals" })).await;

  let reply = send(&h.app, Method::GET, &format!("/simulations/{id}"), Some(ALICE), None).await;
  assert_eq!(reply.status, StatusCode::OK);

  let simulation = &reply.body["simulation"];
  assert_eq!(simulation["input_data"]["materialType"], "metals");
  assert_eq!(simulation["user_id"], "alice");
  assert_eq!(simulation["is_public"], false);
  let confidence = simulation["ai_result"]["confidenceScore"].as_f64().unwrap();
  assert!((0.0..=1.0).contains(&confidence));

  let kinds: Vec<&str> = reply.body["plan"]["panels"].as_array().unwrap().iter().map(|p| p["kind"].as_str().unwrap()).collect();
  assert_eq!(kinds, vec!["confidence", "summary", "method", "efficiency"]);
  assert_eq!(reply.body["plan"]["schema"], "materials");

  let other = send(&h.app, Method::GET, &format!("/simulations/{id}"), Some(BOB), None).await;
  assert_eq!(other.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mining_prompt_lists_only_populated_fields() {
  let h = harness(VALID_ANSWER);
  submit(&h.app, ALICE, json!({ "mineralType": "chalcopyrite", "pH": "1.8", "temperature": "80", "eh": "" })).await;

  let prompt = h.model.last_prompt();
  assert!(prompt.contains("- pH Setpoint: 1.8"));
  assert!(prompt.contains("- Temperature: 80°C"));
  assert!(!prompt.contains("Redox Potential (Eh)"));
}

#[tokio::test]
async fn test_unparseable_answer_is_stored_with_fallback() {
  let h = harness("I'm sorry, the leach model could not be evaluated in JSON.");
  let id = submit(&h.app, ALICE, json!({ "mineralType": "bornite", "pH": "1.6" })).await;

  let reply = send(&h.app, Method::GET, &format!("/simulations/{id}"), Some(ALICE), None).await;
  let result = &reply.body["simulation"]["ai_result"];

  let confidence = result["confidenceScore"].as_f64().unwrap();
  assert!((0.0..=1.0).contains(&confidence));
  assert!(!result["processSummary"].as_str().unwrap().is_empty());
  assert!(result["recoveryData"].as_array().is_some_and(|points| !points.is_empty()));
  assert_eq!(reply.body["plan"]["schema"], "mining");
}

// Ownership
// =========

#[tokio::test]
async fn test_patch_by_another_account_is_forbidden() {
  let h = harness(VALID_ANSWER);
  let id = submit(&h.app, ALICE, json!({ "goal": "Alloy", "materialType": "metals" })).await;

  let reply = set_public(&h.app, BOB, &id, true).await;
  assert_eq!(reply.status, StatusCode::FORBIDDEN);

  let record = h.store.find_owned(&id, "alice").await.unwrap().unwrap();
  assert_eq!(record.is_public, Some(false));
}

#[tokio::test]
async fn test_patch_rejects_non_boolean_visibility() {
  let h = harness(VALID_ANSWER);
  let id = submit(&h.app, ALICE, json!({ "goal": "Alloy" })).await;

  for body in [json!({ "is_public": "true" }), json!({ "is_public": 1 }), json!({})] {
    let reply = send(&h.app, Method::PATCH, &format!("/simulations/{id}"), Some(ALICE), Some(body)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
  }

  let missing = set_public(&h.app, ALICE, "does-not-exist", true).await;
  assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_visibility_toggle_controls_public_reads() {
  let h = harness(VALID_ANSWER);
  let id = submit(&h.app, ALICE, json!({ "goal": "Alloy", "materialType": "metals" })).await;
  let public_uri = format!("/public/simulations/{id}");

  assert_eq!(send(&h.app, Method::GET, &public_uri, Some(BOB), None).await.status, StatusCode::NOT_FOUND);

  let published = set_public(&h.app, ALICE, &id, true).await;
  assert_eq!(published.status, StatusCode::OK);
  assert_eq!(published.body["success"], true);
  assert_eq!(published.body["data"]["is_public"], true);

  let visible = send(&h.app, Method::GET, &public_uri, Some(BOB), None).await;
  assert_eq!(visible.status, StatusCode::OK);
  assert_eq!(visible.body["author"]["email"], "User");

  set_public(&h.app, ALICE, &id, false).await;
  assert_eq!(send(&h.app, Method::GET, &public_uri, Some(BOB), None).await.status, StatusCode::NOT_FOUND);

  set_public(&h.app, ALICE, &id, true).await;
  assert_eq!(send(&h.app, Method::GET, &public_uri, Some(BOB), None).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_checks_existence_then_ownership() {
  let h = harness(VALID_ANSWER);
  let id = submit(&h.app, ALICE, json!({ "goal": "Alloy" })).await;
  let uri = format!("/simulations/{id}");

  assert_eq!(send(&h.app, Method::DELETE, &uri, Some(BOB), None).await.status, StatusCode::FORBIDDEN);
  assert_eq!(h.store.len().await, 1);

  let deleted = send(&h.app, Method::DELETE, &uri, Some(ALICE), None).await;
  assert_eq!(deleted.status, StatusCode::OK);
  assert_eq!(deleted.body, json!({ "success": true, "message": "Simulation deleted successfully" }));

  assert_eq!(send(&h.app, Method::DELETE, &uri, Some(ALICE), None).await.status, StatusCode::NOT_FOUND);
  assert!(h.store.is_empty().await);
}

// Views
// =====

fn seeded_record(id: &str, user: &str, material: &str, is_public: Option<bool>) -> SimulationRecord {
  SimulationRecord {
    id: id.to_string(),
    user_id: user.to_string(),
    title: Some(format!("{material} study")),
    input_data: json!({ "goal": "study", "materialType": material }),
    ai_result: json!({ "confidenceScore": 0.6 }),
    is_public,
    created_at: Utc::now(),
    tags: Some(vec!["seeded".to_string()]),
  }
}

#[tokio::test]
async fn test_knowledge_hub_lists_only_public_records() {
  let store = MemoryRecordStore::with_records(vec![
    seeded_record("pub", "alice", "metals", Some(true)),
    seeded_record("priv", "alice", "polymers", Some(false)),
    seeded_record("legacy", "bob", "ceramics", None),
  ]);
  let profile = AccountProfile { email: "alice@example.com".to_string(), user_metadata: json!({}) };
  let directory: Arc<dyn AccountDirectory> = Arc::new(StaticAccountDirectory::new().with_profile("alice", profile));
  let h = harness_with(VALID_ANSWER, store, Some(directory));

  let reply = send(&h.app, Method::GET, "/public/simulations", Some(BOB), None).await;
  assert_eq!(reply.status, StatusCode::OK);

  let simulations = reply.body["simulations"].as_array().unwrap();
  assert_eq!(simulations.len(), 1);
  assert_eq!(simulations[0]["id"], "pub");
  assert_eq!(simulations[0]["author"]["email"], "alice@example.com");
  assert_eq!(simulations[0]["tags"], json!(["seeded"]));
  assert_eq!(reply.body["materials"], json!(["metals"]));

  let legacy = send(&h.app, Method::GET, "/public/simulations/legacy", Some(BOB), None).await;
  assert_eq!(legacy.status, StatusCode::NOT_FOUND);

  let filtered = send(&h.app, Method::GET, "/public/simulations?material=polymers", Some(BOB), None).await;
  assert!(filtered.body["simulations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_my_simulations_and_dashboard_counts() {
  let store = MemoryRecordStore::with_records(vec![
    seeded_record("a", "alice", "metals", Some(true)),
    seeded_record("b", "alice", "polymers", Some(false)),
    seeded_record("c", "alice", "ceramics", None),
    seeded_record("d", "bob", "metals", Some(true)),
  ]);
  let h = harness_with(VALID_ANSWER, store, None);

  let dashboard = send(&h.app, Method::GET, "/dashboard", Some(ALICE), None).await;
  assert_eq!(dashboard.body["counts"], json!({ "total": 3, "public": 1, "private": 2 }));

  let private = send(&h.app, Method::GET, "/simulations?status=private", Some(ALICE), None).await;
  let mut ids: Vec<&str> =
    private.body["simulations"].as_array().unwrap().iter().map(|s| s["id"].as_str().unwrap()).collect();
  ids.sort();
  assert_eq!(ids, vec!["b", "c"]);

  let search = send(&h.app, Method::GET, "/simulations?search=METALS", Some(ALICE), None).await;
  assert_eq!(search.body["simulations"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_user_profile_falls_back_to_placeholder() {
  let h = harness(VALID_ANSWER);
  let reply = send(&h.app, Method::GET, "/users/someone", Some(ALICE), None).await;
  assert_eq!(reply.status, StatusCode::OK);
  assert_eq!(reply.body, json!({ "email": "User", "user_metadata": {} }));
}

// Request Bodies
// ==============

fn assert_json_bad_request(reply: &Reply) {
  assert_eq!(reply.status, StatusCode::BAD_REQUEST);
  assert_eq!(reply.content_type.as_deref(), Some("application/json"));
  assert!(reply.body["error"].as_str().is_some_and(|e| e.starts_with("Invalid request body")), "{}", reply.body);
}

#[tokio::test]
async fn test_malformed_submission_bodies_answer_json_errors() {
  let h = harness(VALID_ANSWER);

  let syntax = send_raw(&h.app, Method::POST, "/simulate", Some(ALICE), Some("application/json"), Body::from("{not json")).await;
  assert_json_bad_request(&syntax);

  let array = send_raw(&h.app, Method::POST, "/simulate", Some(ALICE), Some("application/json"), Body::from("[1,2]")).await;
  assert_json_bad_request(&array);

  let untyped = send_raw(&h.app, Method::POST, "/simulate", Some(ALICE), None, Body::from(r#"{"goal":"x"}"#)).await;
  assert_json_bad_request(&untyped);

  assert!(h.store.list_owned("alice").await.unwrap().is_empty());
  assert!(h.model.last_prompt().is_empty());
}

#[tokio::test]
async fn test_malformed_visibility_body_answers_json_error() {
  let h = harness(VALID_ANSWER);
  let id = submit(&h.app, ALICE, json!({ "goal": "Alloy" })).await;

  let uri = format!("/simulations/{id}");
  let reply = send_raw(&h.app, Method::PATCH, &uri, Some(ALICE), Some("application/json"), Body::from("{oops")).await;
  assert_json_bad_request(&reply);
  assert!(reply.request_id.is_some());
}

// Templates and Logs
// ==================

#[tokio::test]
async fn test_templates_catalogue() {
  let h = harness(VALID_ANSWER);

  let list = send(&h.app, Method::GET, "/templates", None, None).await;
  assert_eq!(list.status, StatusCode::OK);
  let keys: Vec<&str> = list.body.as_array().unwrap().iter().map(|t| t["key"].as_str().unwrap()).collect();
  assert!(keys.contains(&"chalcopyrite-acidic"));

  let preset = send(&h.app, Method::GET, "/templates/chalcopyrite-acidic", None, None).await;
  assert_eq!(preset.body["fields"]["template"], "chalcopyrite-acidic");
  assert_eq!(preset.body["fields"]["mineralType"], "chalcopyrite");

  let unknown = send(&h.app, Method::GET, "/templates/unknown", None, None).await;
  assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_materials_examples_submit_as_materials_records() {
  let h = harness(VALID_ANSWER);

  let listed = send(&h.app, Method::GET, "/templates?schema=materials", None, None).await;
  let examples = listed.body.as_array().unwrap();
  assert_eq!(examples.len(), 6);
  assert!(examples.iter().all(|t| t["schema"] == "materials"));
  assert!(examples.iter().any(|t| t["key"] == "carbon-steel-thermal-treatment" && t["category"] == "Metals"));

  let example = send(&h.app, Method::GET, "/templates/hdpe-mechanical-properties", None, None).await;
  assert_eq!(example.body["schema"], "materials");
  let fields = example.body["fields"].clone();
  assert_eq!(fields["materialType"], "polymers");

  let id = submit(&h.app, ALICE, fields).await;
  let reply = send(&h.app, Method::GET, &format!("/simulations/{id}"), Some(ALICE), None).await;
  assert_eq!(reply.body["plan"]["schema"], "materials");
  assert_eq!(reply.body["simulation"]["title"], "Polyethylene Mechanical Properties");
  assert!(h.model.last_prompt().contains("- Material Type: polymers"));
}

#[tokio::test]
async fn test_logs_record_request_activity() {
  let h = harness(VALID_ANSWER);
  submit(&h.app, ALICE, json!({ "goal": "Alloy" })).await;

  let anonymous = send(&h.app, Method::GET, "/logs", None, None).await;
  assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

  let reply = send(&h.app, Method::GET, "/logs?level=success", Some(BOB), None).await;
  assert_eq!(reply.status, StatusCode::OK);
  let logs = reply.body["logs"].as_array().unwrap();
  assert!(logs.iter().any(|entry| entry["component"] == "simulate"));
  assert!(logs.iter().all(|entry| entry["level"] == "success"));

  let bad = send(&h.app, Method::GET, "/logs?level=loud", Some(BOB), None).await;
  assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}
