use thiserror::Error;

/// Failures surfaced by every [`crate::RecommendationStore`] backend.
///
/// Reads never report a missing partition as an error; `NotFound` is reserved
/// for targeted deletes that expect the record to exist.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
  #[error("Table '{table}' is already provisioned")]
  SchemaExists { table: String },

  #[error("Failed to provision table: {message}")]
  Provisioning { message: String },

  #[error("No recommendation of user '{recommended_user_id}' for request '{request_id}'")]
  NotFound { request_id: String, recommended_user_id: String },

  #[error("Backend unavailable: {message}")]
  BackendUnavailable { message: String },

  #[error("Invalid recommendation record: {reason}")]
  InvalidRecord { reason: String },

  #[error("Backend error: {message}")]
  Backend { message: String },
}

impl StoreError {
  pub fn schema_exists(table: impl Into<String>) -> Self {
    Self::SchemaExists { table: table.into() }
  }

  pub fn provisioning(message: impl Into<String>) -> Self {
    Self::Provisioning { message: message.into() }
  }

  pub fn not_found(request_id: impl Into<String>, recommended_user_id: impl Into<String>) -> Self {
    Self::NotFound {
      request_id: request_id.into(),
      recommended_user_id: recommended_user_id.into(),
    }
  }

  pub fn backend_unavailable(message: impl Into<String>) -> Self {
    Self::BackendUnavailable { message: message.into() }
  }

  pub fn invalid_record(reason: impl Into<String>) -> Self {
    Self::InvalidRecord { reason: reason.into() }
  }

  pub fn backend(message: impl Into<String>) -> Self {
    Self::Backend { message: message.into() }
  }

  /// Stable key used in API error payloads
  pub fn key(&self) -> &'static str {
    match self {
      Self::SchemaExists { .. } => "schema_exists",
      Self::Provisioning { .. } => "provisioning_failed",
      Self::NotFound { .. } => "recommendation_not_found",
      Self::BackendUnavailable { .. } => "backend_unavailable",
      Self::InvalidRecord { .. } => "invalid_record",
      Self::Backend { .. } => "backend_error",
    }
  }

  /// Whether a caller may reasonably retry the same operation with backoff
  pub fn is_transient(&self) -> bool {
    matches!(self, Self::BackendUnavailable { .. })
  }
}
