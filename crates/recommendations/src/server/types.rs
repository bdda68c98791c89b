//! REST API request and response types

use chrono::{DateTime, Utc};
use matchstore::{RecommendationRecord, SchemaStatus, StoreError, TableSchema};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Base Response Structure
// ======================

/// Base response object for all API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct BaseResponse<T> {
  /// API versioning information
  pub versioning: VersionInfo,

  /// Transaction ID for logging correlation
  pub transaction_id: Uuid,

  /// Optional error information
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub errors: Vec<ApiError>,

  /// Response data (generic for different endpoint types)
  #[serde(flatten)]
  pub data: T,
}

/// API versioning information
#[derive(Debug, Serialize, Deserialize)]
pub struct VersionInfo {
  pub latest: String,
  pub requested: String,
  pub resolved: String,
}

/// API error information
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
  /// Error key, unique to the error source
  pub key: String,

  /// Human readable error message
  pub message: String,

  /// Additional error context
  #[serde(default)]
  pub context: serde_json::Value,
}

// Status/Version Endpoints
// =======================

/// Response for /status endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
  pub status: String,
  pub table_name: String,
  pub schema_status: SchemaStatus,
  pub version: String,
}

/// Response for /version endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResponse {
  pub version: String,
}

// Logs Endpoint
// =============

/// Query parameters for /logs
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LogsQuery {
  /// Maximum number of entries, newest first
  pub limit: Option<usize>,

  /// Level filter (info, success, warn, error, all)
  pub level: Option<String>,
}

/// Response for /logs endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct LogsResponse {
  pub logs: Vec<LogEntry>,
}

pub type LogEntry = crate::server::oplog::LogEntry;

// Recommendation Endpoints
// ========================

/// Request for POST /recommendations
#[derive(Debug, Serialize, Deserialize)]
pub struct PutRecommendationRequest {
  pub request_id: String,
  pub recommended_user_id: String,

  #[serde(default)]
  pub score: Option<f64>,

  /// Seconds until the recommendation expires
  #[serde(default)]
  pub ttl_secs: Option<i64>,
}

impl PutRecommendationRequest {
  pub fn into_record(self) -> Result<RecommendationRecord, StoreError> {
    let candidate = RecommendationCandidate {
      recommended_user_id: self.recommended_user_id,
      score: self.score,
      ttl_secs: self.ttl_secs,
    };
    candidate.into_record(self.request_id)
  }
}

/// One candidate in a replacement set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationCandidate {
  pub recommended_user_id: String,

  #[serde(default)]
  pub score: Option<f64>,

  #[serde(default)]
  pub ttl_secs: Option<i64>,
}

impl RecommendationCandidate {
  /// Build the stored record; a ttl too large to place on the calendar is an
  /// invalid record
  pub fn into_record(
    self,
    request_id: impl Into<String>,
  ) -> Result<RecommendationRecord, StoreError> {
    let mut record = RecommendationRecord::new(request_id, self.recommended_user_id);
    if let Some(score) = self.score {
      record = record.with_score(score);
    }
    if let Some(ttl) = self.ttl_secs {
      record = record.expiring_after_secs(ttl)?;
    }
    Ok(record)
  }
}

/// Request for PUT /recommendations/{request_id}
#[derive(Debug, Serialize, Deserialize)]
pub struct ReplaceRecommendationsRequest {
  pub recommendations: Vec<RecommendationCandidate>,
}

/// Query parameters for GET /recommendations/{request_id}
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GetRecommendationsQuery {
  /// Order best-first by score instead of storage order
  #[serde(default)]
  pub ranked: bool,
}

/// Query parameters for DELETE /recommendations/{request_id}/{user_id}
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DeleteRecommendationQuery {
  /// Fail with 404 when the recommendation does not exist
  #[serde(default)]
  pub expect: bool,
}

/// Response carrying a single stored recommendation
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
  pub recommendation: RecommendationRecord,
}

/// Response for GET /recommendations/{request_id}
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationsResponse {
  pub request_id: String,
  pub recommendations: Vec<RecommendationRecord>,
  pub count: usize,
}

/// Response for DELETE /recommendations/{request_id}
#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
  pub request_id: String,
  pub removed: usize,
}

// Schema Endpoints
// ================

/// Response for /schema endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct SchemaResponse {
  pub schema: TableSchema,
  pub status: SchemaStatus,
  pub checked_at: DateTime<Utc>,
}

// Helper Functions
// ================

fn current_version() -> VersionInfo {
  let version = env!("CARGO_PKG_VERSION");
  VersionInfo {
    latest: version.to_string(),
    requested: version.to_string(),
    resolved: version.to_string(),
  }
}

impl<T> BaseResponse<T> {
  /// Create a successful response
  pub fn success(data: T, transaction_id: Uuid) -> Self {
    Self { versioning: current_version(), transaction_id, errors: Vec::new(), data }
  }

  /// Create an error response
  pub fn error(errors: Vec<ApiError>, transaction_id: Uuid) -> BaseResponse<()> {
    BaseResponse { versioning: current_version(), transaction_id, errors, data: () }
  }
}

impl ApiError {
  pub fn new(key: &str, message: &str) -> Self {
    Self { key: key.to_string(), message: message.to_string(), context: serde_json::Value::Null }
  }
}
