//! Operation log for the recommendations server
//!
//! Bounded in-memory ring of structured entries, served back through
//! `GET /logs`. Every entry is also emitted as a `tracing` event so the
//! console subscriber sees the same stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::Mutex;

pub const DEFAULT_CAPACITY: usize = 1000;

// Types and Data Structures
// =========================

/// Request context attached to a log entry
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct LogContext {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub request_id: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub method: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub path: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration_ms: Option<f64>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub status_code: Option<u16>,
}

/// A structured log entry for server operations
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LogEntry {
  pub timestamp: DateTime<Utc>,
  pub level: String,
  pub message: String,
  pub component: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub context: Option<LogContext>,
}

pub struct OperationLog {
  entries: Mutex<VecDeque<LogEntry>>,
  capacity: usize,
}

impl Default for OperationLog {
  fn default() -> Self {
    Self::new(DEFAULT_CAPACITY)
  }
}

// Core API
// ========

impl OperationLog {
  pub fn new(capacity: usize) -> Self {
    let capacity = capacity.max(1);
    Self { entries: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))), capacity }
  }

  /// Append an entry, evicting the oldest once the ring is full
  pub async fn add_log_with_context(
    &self,
    level: &str,
    message: &str,
    component: &str,
    context: Option<LogContext>,
  ) {
    emit(level, message, component);

    let entry = LogEntry {
      timestamp: Utc::now(),
      level: level.to_string(),
      message: message.to_string(),
      component: component.to_string(),
      context,
    };

    let mut entries = self.entries.lock().await;
    if entries.len() == self.capacity {
      entries.pop_front();
    }
    entries.push_back(entry);
  }

  pub async fn add_log(&self, level: &str, message: &str, component: &str) {
    self.add_log_with_context(level, message, component, None).await;
  }

  /// Most recent entries, oldest first, optionally filtered by level.
  /// A level of `"all"` matches everything.
  pub async fn get_logs(&self, limit: Option<usize>, level_filter: Option<&str>) -> Vec<LogEntry> {
    let entries = self.entries.lock().await;

    let matching: Vec<&LogEntry> = entries
      .iter()
      .filter(|entry| level_filter.is_none_or(|filter| filter == "all" || entry.level == filter))
      .collect();

    let skip = limit.map_or(0, |limit| matching.len().saturating_sub(limit));
    matching.into_iter().skip(skip).cloned().collect()
  }

  pub async fn len(&self) -> usize {
    self.entries.lock().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.entries.lock().await.is_empty()
  }
}

// Standard Logging Wrappers
// =========================

impl OperationLog {
  pub async fn info(&self, message: &str, component: &str) {
    self.add_log("info", message, component).await;
  }

  pub async fn success(&self, message: &str, component: &str) {
    self.add_log("success", message, component).await;
  }

  pub async fn warn(&self, message: &str, component: &str) {
    self.add_log("warn", message, component).await;
  }

  pub async fn error(&self, message: &str, component: &str) {
    self.add_log("error", message, component).await;
  }
}

fn emit(level: &str, message: &str, component: &str) {
  match level {
    "warn" => tracing::warn!(component, "{message}"),
    "error" => tracing::error!(component, "{message}"),
    "debug" => tracing::debug!(component, "{message}"),
    _ => tracing::info!(component, "{message}"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_ring_evicts_oldest_entries() {
    let log = OperationLog::new(2);
    log.info("first", "test").await;
    log.info("second", "test").await;
    log.info("third", "test").await;

    let messages: Vec<_> = log.get_logs(None, None).await.into_iter().map(|e| e.message).collect();
    assert_eq!(messages, vec!["second", "third"]);
  }

  #[tokio::test]
  async fn test_limit_keeps_most_recent_in_order() {
    let log = OperationLog::new(10);
    for i in 0..5 {
      log.info(&format!("entry {i}"), "test").await;
    }

    let messages: Vec<_> =
      log.get_logs(Some(2), None).await.into_iter().map(|e| e.message).collect();
    assert_eq!(messages, vec!["entry 3", "entry 4"]);
  }

  #[tokio::test]
  async fn test_level_filter() {
    let log = OperationLog::default();
    log.info("fine", "test").await;
    log.error("broken", "test").await;
    log.success("done", "test").await;

    let errors = log.get_logs(None, Some("error")).await;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "broken");

    assert_eq!(log.get_logs(None, Some("all")).await.len(), 3);
  }

  #[tokio::test]
  async fn test_zero_capacity_still_keeps_latest() {
    let log = OperationLog::new(0);
    log.warn("only", "test").await;
    assert_eq!(log.len().await, 1);
  }
}
