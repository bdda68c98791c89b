//! Display formatting utilities for CLI output

use chrono::{DateTime, Utc};
use colored::*;
use matchstore::{RecommendationRecord, SchemaStatus};

use crate::server::oplog::{LogContext, LogEntry};

/// One line per recommendation: user, score, expiry
pub fn format_recommendation(record: &RecommendationRecord) -> String {
  let score = match record.score {
    Some(score) => format!("{score:.3}"),
    None => "-".to_string(),
  };

  let mut line =
    format!("{} {}", record.recommended_user_id.bold(), format!("score {score}").dimmed());
  if let Some(expires_at) = record.expires_at {
    line.push_str(&format!(" {}", format!("expires {}", format_time(expires_at)).dimmed()));
  }
  line
}

pub fn format_time(at: DateTime<Utc>) -> String {
  at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn colored_status(status: &SchemaStatus) -> ColoredString {
  let text = status.to_string();
  match status {
    SchemaStatus::Active => text.green().bold(),
    SchemaStatus::Creating => text.yellow(),
    SchemaStatus::Missing => text.red(),
    SchemaStatus::Other(_) => text.normal(),
  }
}

pub fn colored_level(level: &str) -> ColoredString {
  match level {
    "error" => level.red().bold(),
    "warn" => level.yellow().bold(),
    "info" => level.blue().bold(),
    "debug" => level.green(),
    "success" => level.bright_green().bold(),
    _ => level.normal(),
  }
}

fn format_context(context: &LogContext) -> Option<String> {
  let mut parts = Vec::new();

  if let Some(request_id) = &context.request_id {
    parts.push(format!("request_id: {}", request_id.bright_blue()));
  }
  if let Some(method) = &context.method {
    parts.push(format!("method: {}", method.magenta().bold()));
  }
  if let Some(path) = &context.path {
    parts.push(format!("path: {}", path.cyan()));
  }
  if let Some(status_code) = context.status_code {
    let status = status_code.to_string();
    let status = match status_code {
      200..=299 => status.green(),
      300..=399 => status.yellow(),
      400..=499 => status.red(),
      500..=599 => status.bright_red().bold(),
      _ => status.white(),
    };
    parts.push(format!("status: {status}"));
  }
  if let Some(duration) = context.duration_ms {
    parts.push(format!("duration: {}", format!("{duration:.2}ms").dimmed()));
  }

  if parts.is_empty() {
    None
  } else {
    Some(parts.join(", "))
  }
}

pub fn display_log_entry(entry: &LogEntry) {
  println!(
    "{} [{}] {} {}",
    format_time(entry.timestamp).cyan(),
    colored_level(&entry.level),
    entry.component.dimmed(),
    entry.message
  );

  if let Some(context) = entry.context.as_ref().and_then(format_context) {
    println!("    {context}");
  }
}
