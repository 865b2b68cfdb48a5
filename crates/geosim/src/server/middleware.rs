//! Request context middleware
//!
//! Every request gets a UUID, a start and a completion entry in the
//! activity log, and an `x-request-id` response header. Handlers reach the
//! context through `Extension<RequestContext>`.

use axum::{
  extract::{Request, State},
  http::{header::USER_AGENT, HeaderName, HeaderValue, Method},
  middleware::Next,
  response::Response,
};
use std::time::Instant;
use uuid::Uuid;

use crate::activity::{ActivityLevel, ActivityLog, RequestTrace};
use crate::server::state::AppState;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Clone)]
pub struct RequestContext {
  pub request_id: Uuid,
  pub method: Method,
  pub path: String,
  pub user_agent: Option<String>,
  pub activity: ActivityLog,
}

impl RequestContext {
  pub fn new(request: &Request, activity: ActivityLog) -> Self {
    Self {
      request_id: Uuid::new_v4(),
      method: request.method().clone(),
      path: request.uri().path().to_string(),
      user_agent: request.headers().get(USER_AGENT).and_then(|v| v.to_str().ok()).map(str::to_string),
      activity,
    }
  }

  fn trace(&self, status_code: Option<u16>, duration_ms: Option<f64>) -> RequestTrace {
    RequestTrace {
      request_id: Some(self.request_id.to_string()),
      method: Some(self.method.to_string()),
      path: Some(self.path.clone()),
      user_agent: self.user_agent.clone(),
      duration_ms,
      status_code,
    }
  }

  async fn log(&self, level: ActivityLevel, message: &str, component: &str) {
    self.activity.record(level, message, component, Some(self.trace(None, None))).await;
  }

  pub async fn log_info(&self, message: &str, component: &str) {
    self.log(ActivityLevel::Info, message, component).await;
  }

  pub async fn log_success(&self, message: &str, component: &str) {
    self.log(ActivityLevel::Success, message, component).await;
  }

  pub async fn log_warn(&self, message: &str, component: &str) {
    self.log(ActivityLevel::Warn, message, component).await;
  }

  pub async fn log_error(&self, message: &str, component: &str) {
    self.log(ActivityLevel::Error, message, component).await;
  }

  pub async fn log_request_start(&self) {
    self.log(ActivityLevel::Info, "Request started", "http-request").await;
  }

  pub async fn log_request_complete(&self, status_code: u16, duration_ms: f64) {
    let level = if status_code >= 500 { ActivityLevel::Error } else { ActivityLevel::Info };
    let trace = self.trace(Some(status_code), Some(duration_ms));
    self.activity.record(level, "Request completed", "http-request", Some(trace)).await;
  }
}

pub async fn request_context(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
  let context = RequestContext::new(&request, state.activity.clone());
  let started = Instant::now();
  context.log_request_start().await;

  request.extensions_mut().insert(context.clone());
  let mut response = next.run(request).await;

  let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
  context.log_request_complete(response.status().as_u16(), duration_ms).await;

  if let Ok(value) = HeaderValue::from_str(&context.request_id.to_string()) {
    response.headers_mut().insert(REQUEST_ID_HEADER, value);
  }
  response
}
