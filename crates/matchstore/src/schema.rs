//! Table schema for the recommendations store
//!
//! ```text
//! Table: MatchingRecommendations
//!   Partition key: request_id (string)
//!   Sort key:      recommended_user_id (string)
//!   Throughput:    5 read units / 5 write units (fixed provisioning)
//!
//! Attributes:
//!   - request_id: String (PK)
//!   - recommended_user_id: String (SK)
//!   - score: Number (optional) - match score, higher is better
//!   - expires_at: Number (optional) - Unix epoch seconds, TTL attribute
//!   - created_at: String - RFC 3339 timestamp
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default table name
pub const DEFAULT_TABLE_NAME: &str = "MatchingRecommendations";

/// Partition key attribute
pub const ATTR_REQUEST_ID: &str = "request_id";

/// Sort key attribute
pub const ATTR_RECOMMENDED_USER_ID: &str = "recommended_user_id";

/// Optional match score
pub const ATTR_SCORE: &str = "score";

/// Optional expiry, Unix epoch seconds
pub const ATTR_EXPIRES_AT: &str = "expires_at";

/// Creation timestamp
pub const ATTR_CREATED_AT: &str = "created_at";

pub const DEFAULT_READ_CAPACITY: i64 = 5;
pub const DEFAULT_WRITE_CAPACITY: i64 = 5;

/// Key layout and throughput of the provisioned table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
  pub table_name: String,
  pub partition_key: String,
  pub sort_key: String,
  pub read_capacity: i64,
  pub write_capacity: i64,
}

impl Default for TableSchema {
  fn default() -> Self {
    Self::named(DEFAULT_TABLE_NAME)
  }
}

impl TableSchema {
  /// The fixed two-key schema under a custom table name
  pub fn named(table_name: impl Into<String>) -> Self {
    Self {
      table_name: table_name.into(),
      partition_key: ATTR_REQUEST_ID.to_string(),
      sort_key: ATTR_RECOMMENDED_USER_ID.to_string(),
      read_capacity: DEFAULT_READ_CAPACITY,
      write_capacity: DEFAULT_WRITE_CAPACITY,
    }
  }

  pub fn with_throughput(mut self, read_capacity: i64, write_capacity: i64) -> Self {
    self.read_capacity = read_capacity;
    self.write_capacity = write_capacity;
    self
  }
}

impl fmt::Display for TableSchema {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Table: {}", self.table_name)?;
    writeln!(f, "  Partition key: {} (string)", self.partition_key)?;
    writeln!(f, "  Sort key:      {} (string)", self.sort_key)?;
    write!(
      f,
      "  Throughput:    {} read units / {} write units",
      self.read_capacity, self.write_capacity
    )
  }
}

/// Provisioning state of the backing table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "state", content = "detail")]
pub enum SchemaStatus {
  Missing,
  Creating,
  Active,
  Other(String),
}

impl fmt::Display for SchemaStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Missing => write!(f, "missing"),
      Self::Creating => write!(f, "creating"),
      Self::Active => write!(f, "active"),
      Self::Other(state) => write!(f, "{}", state.to_lowercase()),
    }
  }
}

/// Description of a table as reported after provisioning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
  pub schema: TableSchema,
  pub status: SchemaStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub table_arn: Option<String>,
}
