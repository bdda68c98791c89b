//! Store configuration
//!
//! Credentials and region are handed to the store explicitly through
//! [`StoreConfig`]; nothing here reads process-wide SDK state. Binaries build
//! the config from [`StoreArgs`], which falls back to the usual AWS environment
//! variables.

use anyhow::{anyhow, Result};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::schema::{TableSchema, DEFAULT_READ_CAPACITY, DEFAULT_TABLE_NAME, DEFAULT_WRITE_CAPACITY};

/// Which backend serves the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
  /// In-process map, lost on exit
  Memory,
  /// DynamoDB or a DynamoDB-compatible endpoint
  #[default]
  Dynamodb,
}

/// Everything a store needs to reach its backend
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
  pub backend: BackendKind,
  pub table_name: String,
  pub region: Option<String>,
  pub access_key_id: Option<String>,
  pub secret_access_key: Option<String>,
  pub session_token: Option<String>,
  /// Endpoint override, e.g. DynamoDB Local at http://localhost:8000
  pub endpoint_url: Option<String>,
  pub read_capacity: i64,
  pub write_capacity: i64,
  /// Upper bound for a single backend call
  pub operation_timeout_secs: u64,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      backend: BackendKind::default(),
      table_name: DEFAULT_TABLE_NAME.to_string(),
      region: None,
      access_key_id: None,
      secret_access_key: None,
      session_token: None,
      endpoint_url: None,
      read_capacity: DEFAULT_READ_CAPACITY,
      write_capacity: DEFAULT_WRITE_CAPACITY,
      operation_timeout_secs: 10,
    }
  }
}

impl StoreConfig {
  /// Config for an in-memory store
  pub fn memory() -> Self {
    Self { backend: BackendKind::Memory, ..Self::default() }
  }

  /// The table layout this config provisions
  pub fn schema(&self) -> TableSchema {
    TableSchema::named(&self.table_name).with_throughput(self.read_capacity, self.write_capacity)
  }

  /// Reject configs that cannot possibly reach their backend
  pub fn validate(&self) -> Result<()> {
    if self.table_name.trim().is_empty() {
      return Err(anyhow!("Table name must not be empty"));
    }
    if self.read_capacity < 1 || self.write_capacity < 1 {
      return Err(anyhow!(
        "Throughput must be at least 1 unit, got {} read / {} write",
        self.read_capacity,
        self.write_capacity
      ));
    }
    if self.operation_timeout_secs == 0 {
      return Err(anyhow!("Operation timeout must be at least 1 second"));
    }

    if self.backend == BackendKind::Dynamodb {
      require(&self.region, "region (AWS_REGION)")?;
      require(&self.access_key_id, "access key id (AWS_ACCESS_KEY_ID)")?;
      require(&self.secret_access_key, "secret access key (AWS_SECRET_ACCESS_KEY)")?;
    }

    Ok(())
  }
}

fn require(value: &Option<String>, what: &str) -> Result<()> {
  match value.as_deref().map(str::trim) {
    Some(v) if !v.is_empty() => Ok(()),
    _ => Err(anyhow!("DynamoDB backend requires a {what}")),
  }
}

/// Command-line view of [`StoreConfig`]
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
  /// Storage backend
  #[arg(long, value_enum, env = "RECOMMENDATIONS_BACKEND", default_value = "dynamodb")]
  pub backend: BackendKind,

  /// Table holding the recommendations
  #[arg(long, env = "RECOMMENDATIONS_TABLE", default_value = DEFAULT_TABLE_NAME)]
  pub table: String,

  /// AWS region
  #[arg(long, env = "AWS_REGION")]
  pub region: Option<String>,

  /// AWS access key id
  #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
  pub access_key_id: Option<String>,

  /// AWS secret access key
  #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
  pub secret_access_key: Option<String>,

  /// AWS session token for temporary credentials
  #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
  pub session_token: Option<String>,

  /// Endpoint override, e.g. DynamoDB Local
  #[arg(long, env = "RECOMMENDATIONS_ENDPOINT_URL")]
  pub endpoint_url: Option<String>,

  /// Provisioned read capacity units
  #[arg(long, default_value_t = DEFAULT_READ_CAPACITY)]
  pub read_capacity: i64,

  /// Provisioned write capacity units
  #[arg(long, default_value_t = DEFAULT_WRITE_CAPACITY)]
  pub write_capacity: i64,

  /// Timeout for a single backend call, in seconds
  #[arg(long, env = "RECOMMENDATIONS_TIMEOUT_SECS", default_value_t = 10)]
  pub operation_timeout_secs: u64,
}

impl StoreArgs {
  /// Build and validate the store config
  pub fn into_config(self) -> Result<StoreConfig> {
    let config = StoreConfig {
      backend: self.backend,
      table_name: self.table,
      region: self.region,
      access_key_id: self.access_key_id,
      secret_access_key: self.secret_access_key,
      session_token: self.session_token,
      endpoint_url: self.endpoint_url,
      read_capacity: self.read_capacity,
      write_capacity: self.write_capacity,
      operation_timeout_secs: self.operation_timeout_secs,
    };
    config.validate()?;
    Ok(config)
  }
}
