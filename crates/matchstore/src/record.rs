//! Recommendation records and their validation rules

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::StoreError;

/// Largest score magnitude a DynamoDB Number can hold
pub const MAX_SCORE_MAGNITUDE: f64 = 9.999_999_999_999_999e125;

/// Smallest non-zero score magnitude a DynamoDB Number can hold
pub const MIN_SCORE_MAGNITUDE: f64 = 1e-130;

/// One (request, candidate) pairing produced by the matching process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
  /// Matching request this recommendation belongs to (partition key)
  pub request_id: String,

  /// Candidate user recommended for the request (sort key)
  pub recommended_user_id: String,

  /// Match score, higher is better
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub score: Option<f64>,

  /// Instant after which the record is no longer served
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub expires_at: Option<DateTime<Utc>>,

  /// When the recommendation was generated
  pub created_at: DateTime<Utc>,
}

impl RecommendationRecord {
  pub fn new(request_id: impl Into<String>, recommended_user_id: impl Into<String>) -> Self {
    Self {
      request_id: request_id.into(),
      recommended_user_id: recommended_user_id.into(),
      score: None,
      expires_at: None,
      created_at: Utc::now(),
    }
  }

  pub fn with_score(mut self, score: f64) -> Self {
    self.score = Some(score);
    self
  }

  /// Expire at the given instant. Truncated to whole seconds, the resolution
  /// DynamoDB TTL attributes are stored at.
  pub fn expiring_at(mut self, at: DateTime<Utc>) -> Self {
    self.expires_at = DateTime::from_timestamp(at.timestamp(), 0);
    self
  }

  /// Expire `ttl` after now. Fails when the expiry lies outside the
  /// representable date range.
  pub fn expiring_after(self, ttl: Duration) -> Result<Self, StoreError> {
    let at = Utc::now().checked_add_signed(ttl).ok_or_else(|| {
      StoreError::invalid_record(format!("ttl of {}s is out of range", ttl.num_seconds()))
    })?;
    Ok(self.expiring_at(at))
  }

  /// Expire `secs` seconds after now
  pub fn expiring_after_secs(self, secs: i64) -> Result<Self, StoreError> {
    let ttl = Duration::try_seconds(secs)
      .ok_or_else(|| StoreError::invalid_record(format!("ttl of {secs}s is out of range")))?;
    self.expiring_after(ttl)
  }

  /// The composite primary key of this record
  pub fn key(&self) -> (&str, &str) {
    (&self.request_id, &self.recommended_user_id)
  }

  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    self.expires_at.is_some_and(|at| at <= now)
  }

  pub fn validate(&self) -> Result<(), StoreError> {
    if self.request_id.trim().is_empty() {
      return Err(StoreError::invalid_record("request_id must not be empty"));
    }
    if self.recommended_user_id.trim().is_empty() {
      return Err(StoreError::invalid_record("recommended_user_id must not be empty"));
    }
    if let Some(score) = self.score {
      if !score.is_finite() {
        return Err(StoreError::invalid_record(format!("score must be finite, got {score}")));
      }
      let magnitude = score.abs();
      if magnitude > MAX_SCORE_MAGNITUDE || (magnitude != 0.0 && magnitude < MIN_SCORE_MAGNITUDE) {
        return Err(StoreError::invalid_record(format!(
          "score {score:e} is outside the storable range"
        )));
      }
    }
    Ok(())
  }
}

/// Order a request's recommendations best-first.
///
/// Scored records come before unscored ones; equal scores fall back to the
/// candidate id so the output is deterministic.
pub fn ranked(mut records: Vec<RecommendationRecord>) -> Vec<RecommendationRecord> {
  records.sort_by(compare_rank);
  records
}

fn compare_rank(a: &RecommendationRecord, b: &RecommendationRecord) -> Ordering {
  let by_score = match (a.score, b.score) {
    (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  };
  by_score.then_with(|| a.recommended_user_id.cmp(&b.recommended_user_id))
}
