//! Activity log for the GeoSim server
//!
//! Append-only JSONL file of structured entries, shared across handlers
//! through a cloneable handle. Every entry is mirrored to `tracing`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

// Types
// =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
  Info,
  Success,
  Warn,
  Error,
}

impl ActivityLevel {
  pub fn parse(level: &str) -> Option<Self> {
    match level.to_ascii_lowercase().as_str() {
      "info" => Some(Self::Info),
      "success" => Some(Self::Success),
      "warn" | "warning" => Some(Self::Warn),
      "error" => Some(Self::Error),
      _ => None,
    }
  }
}

/// Request metadata attached to an entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RequestTrace {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub request_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub method: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub path: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_agent: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration_ms: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status_code: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ActivityEntry {
  pub timestamp: DateTime<Utc>,
  pub level: ActivityLevel,
  pub message: String,
  pub component: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub context: Option<RequestTrace>,
}

struct ActivityFile {
  path: PathBuf,
}

#[derive(Clone)]
pub struct ActivityLog {
  inner: Arc<Mutex<ActivityFile>>,
}

// File Operations
// ===============

impl ActivityFile {
  fn open(path: &Path) -> std::io::Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    // Never truncate an existing log
    OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Self { path: path.to_path_buf() })
  }

  fn append(&self, entry: &ActivityEntry) -> std::io::Result<()> {
    let line = serde_json::to_string(entry)
      .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
    writeln!(file, "{line}")?;
    file.flush()
  }

  /// Newest `limit` entries matching `level`, returned oldest first
  fn read(&self, limit: Option<usize>, level: Option<ActivityLevel>) -> std::io::Result<Vec<ActivityEntry>> {
    if !self.path.exists() {
      return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(&self.path)?);
    let mut entries = Vec::new();
    for line in reader.lines() {
      let line = line?;
      if line.trim().is_empty() {
        continue;
      }
      // Malformed lines are skipped
      let Ok(entry) = serde_json::from_str::<ActivityEntry>(&line) else {
        continue;
      };
      if level.is_none_or(|level| entry.level == level) {
        entries.push(entry);
      }
    }

    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    if let Some(limit) = limit {
      entries.truncate(limit);
    }
    entries.reverse();
    Ok(entries)
  }
}

// Public API
// ==========

impl ActivityLog {
  pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
    let file = ActivityFile::open(path.as_ref())?;
    Ok(Self { inner: Arc::new(Mutex::new(file)) })
  }

  pub async fn path(&self) -> PathBuf {
    self.inner.lock().await.path.clone()
  }

  pub async fn append(
    &self,
    level: ActivityLevel,
    message: &str,
    component: &str,
    context: Option<RequestTrace>,
  ) -> std::io::Result<()> {
    let entry = ActivityEntry {
      timestamp: Utc::now(),
      level,
      message: message.to_string(),
      component: component.to_string(),
      context,
    };
    self.inner.lock().await.append(&entry)
  }

  /// Write an entry and mirror it to tracing; write failures are only traced
  pub async fn record(&self, level: ActivityLevel, message: &str, component: &str, context: Option<RequestTrace>) {
    match level {
      ActivityLevel::Info | ActivityLevel::Success => tracing::info!(component, "{message}"),
      ActivityLevel::Warn => tracing::warn!(component, "{message}"),
      ActivityLevel::Error => tracing::error!(component, "{message}"),
    }

    if let Err(e) = self.append(level, message, component, context).await {
      tracing::warn!(error = %e, "Failed to write activity log entry");
    }
  }

  pub async fn info(&self, message: &str, component: &str) {
    self.record(ActivityLevel::Info, message, component, None).await;
  }

  pub async fn success(&self, message: &str, component: &str) {
    self.record(ActivityLevel::Success, message, component, None).await;
  }

  pub async fn warn(&self, message: &str, component: &str) {
    self.record(ActivityLevel::Warn, message, component, None).await;
  }

  pub async fn error(&self, message: &str, component: &str) {
    self.record(ActivityLevel::Error, message, component, None).await;
  }

  pub async fn recent(
    &self,
    limit: Option<usize>,
    level: Option<ActivityLevel>,
  ) -> std::io::Result<Vec<ActivityEntry>> {
    self.inner.lock().await.read(limit, level)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  fn temp_log() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("logs").join("activity.jsonl");
    (dir, path)
  }

  #[tokio::test]
  async fn test_open_creates_parents_without_truncating() {
    let (_dir, path) = temp_log();
    let log = ActivityLog::open(&path).unwrap();
    log.info("first", "test").await;

    let reopened = ActivityLog::open(&path).unwrap();
    assert_eq!(reopened.recent(None, None).await.unwrap().len(), 1);
    assert_eq!(reopened.path().await, path);
  }

  #[tokio::test]
  async fn test_entries_are_jsonl() {
    let (_dir, path) = temp_log();
    let log = ActivityLog::open(&path).unwrap();
    log.success("stored", "simulate").await;
    log.warn("fallback", "normalizer").await;

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.trim().lines().collect();
    assert_eq!(lines.len(), 2);

    let entry: ActivityEntry = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(entry.level, ActivityLevel::Success);
    assert_eq!(entry.component, "simulate");
    assert!(lines[0].contains("\"level\":\"success\""));
  }

  #[tokio::test]
  async fn test_recent_filters_and_limits() {
    let (_dir, path) = temp_log();
    let log = ActivityLog::open(&path).unwrap();
    for i in 1..=3 {
      log.info(&format!("info {i}"), "test").await;
      log.error(&format!("error {i}"), "test").await;
    }

    let errors = log.recent(None, Some(ActivityLevel::Error)).await.unwrap();
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().all(|entry| entry.level == ActivityLevel::Error));

    assert_eq!(log.recent(Some(4), None).await.unwrap().len(), 4);
    assert!(log.recent(Some(0), None).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_malformed_lines_are_skipped() {
    let (_dir, path) = temp_log();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
      &path,
      r#"{"timestamp":"2024-01-01T12:00:00Z","level":"info","message":"ok","component":"test"}
not json
{"timestamp":"2024-01-01T12:01:00Z","level":"verbose","message":"unknown level","component":"test"}
"#,
    )
    .unwrap();

    let log = ActivityLog::open(&path).unwrap();
    let entries = log.recent(None, None).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "ok");
  }

  #[tokio::test]
  async fn test_context_round_trips() {
    let (_dir, path) = temp_log();
    let log = ActivityLog::open(&path).unwrap();
    let context = RequestTrace { request_id: Some("req-1".to_string()), status_code: Some(201), ..Default::default() };
    log.record(ActivityLevel::Info, "Request completed", "http-request", Some(context.clone())).await;

    let entries = log.recent(None, None).await.unwrap();
    assert_eq!(entries[0].context.as_ref(), Some(&context));
  }

  #[test]
  fn test_level_parse() {
    assert_eq!(ActivityLevel::parse("ERROR"), Some(ActivityLevel::Error));
    assert_eq!(ActivityLevel::parse("warning"), Some(ActivityLevel::Warn));
    assert_eq!(ActivityLevel::parse("all"), None);
  }
}
