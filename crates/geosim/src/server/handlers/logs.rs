//! Activity log endpoint

use axum::{
  extract::{Extension, Query},
  response::Json,
};

use crate::activity::ActivityLevel;
use crate::error::ApiError;
use crate::server::{
  extract::CurrentAccount,
  middleware::RequestContext,
  types::{LogsQuery, LogsResponse},
};

const DEFAULT_LIMIT: usize = 100;

/// GET /logs - Most recent activity entries, oldest first; signed-in callers only
pub async fn get_logs(
  Extension(context): Extension<RequestContext>,
  CurrentAccount(_account): CurrentAccount,
  Query(query): Query<LogsQuery>,
) -> Result<Json<LogsResponse>, ApiError> {
  let level = match query.level.as_deref() {
    None | Some("all") => None,
    Some(level) => {
      Some(ActivityLevel::parse(level).ok_or_else(|| ApiError::bad_request(format!("Unknown log level '{level}'")))?)
    }
  };

  match context.activity.recent(Some(query.limit.unwrap_or(DEFAULT_LIMIT)), level).await {
    Ok(logs) => Ok(Json(LogsResponse { logs })),
    Err(e) => {
      context.log_error(&format!("Failed to read logs: {e}"), "logs-api").await;
      Err(ApiError::internal("Failed to read logs", e))
    }
  }
}
