//! In-process backend
//!
//! Partitions map to ordered maps keyed by candidate id, so reads come back in
//! the same sort-key order DynamoDB's `Query` uses.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::record::RecommendationRecord;
use crate::schema::{SchemaStatus, TableSchema};
use crate::store::{check_replacement, is_addressable, RecommendationStore};

type Partitions = BTreeMap<String, BTreeMap<String, RecommendationRecord>>;

#[derive(Default)]
struct Table {
  provisioned: bool,
  partitions: Partitions,
}

/// Recommendation store held entirely in memory
pub struct MemoryStore {
  schema: TableSchema,
  table: RwLock<Table>,
}

impl Default for MemoryStore {
  fn default() -> Self {
    Self::new()
  }
}

impl MemoryStore {
  /// An unprovisioned store; call `create_schema` before use
  pub fn new() -> Self {
    Self::with_schema(TableSchema::default())
  }

  pub fn with_schema(schema: TableSchema) -> Self {
    Self { schema, table: RwLock::new(Table::default()) }
  }

  /// A store whose table already exists
  pub fn provisioned() -> Self {
    let table = Table { provisioned: true, partitions: Partitions::new() };
    Self { schema: TableSchema::default(), table: RwLock::new(table) }
  }

  fn not_provisioned(&self) -> StoreError {
    StoreError::backend_unavailable(format!(
      "table '{}' is not provisioned",
      self.schema.table_name
    ))
  }
}

#[async_trait]
impl RecommendationStore for MemoryStore {
  async fn put(&self, record: RecommendationRecord) -> Result<(), StoreError> {
    record.validate()?;

    let mut table = self.table.write().await;
    if !table.provisioned {
      return Err(self.not_provisioned());
    }

    tracing::trace!(request_id = %record.request_id, user = %record.recommended_user_id, "put");
    table
      .partitions
      .entry(record.request_id.clone())
      .or_default()
      .insert(record.recommended_user_id.clone(), record);
    Ok(())
  }

  async fn get_by_request(
    &self,
    request_id: &str,
  ) -> Result<Vec<RecommendationRecord>, StoreError> {
    if !is_addressable(request_id) {
      return Ok(Vec::new());
    }

    let table = self.table.read().await;
    if !table.provisioned {
      return Err(self.not_provisioned());
    }

    let now = Utc::now();
    let records = table
      .partitions
      .get(request_id)
      .map(|partition| partition.values().filter(|r| !r.is_expired_at(now)).cloned().collect())
      .unwrap_or_default();
    Ok(records)
  }

  async fn delete(&self, request_id: &str, recommended_user_id: &str) -> Result<(), StoreError> {
    if !is_addressable(request_id) || !is_addressable(recommended_user_id) {
      return Ok(());
    }

    let mut table = self.table.write().await;
    if !table.provisioned {
      return Err(self.not_provisioned());
    }

    remove_record(&mut table.partitions, request_id, recommended_user_id);
    Ok(())
  }

  async fn delete_expected(
    &self,
    request_id: &str,
    recommended_user_id: &str,
  ) -> Result<(), StoreError> {
    if !is_addressable(request_id) || !is_addressable(recommended_user_id) {
      return Err(StoreError::not_found(request_id, recommended_user_id));
    }

    let mut table = self.table.write().await;
    if !table.provisioned {
      return Err(self.not_provisioned());
    }

    match remove_record(&mut table.partitions, request_id, recommended_user_id) {
      Some(_) => Ok(()),
      None => Err(StoreError::not_found(request_id, recommended_user_id)),
    }
  }

  async fn delete_request(&self, request_id: &str) -> Result<usize, StoreError> {
    if !is_addressable(request_id) {
      return Ok(0);
    }

    let mut table = self.table.write().await;
    if !table.provisioned {
      return Err(self.not_provisioned());
    }

    Ok(table.partitions.remove(request_id).map(|p| p.len()).unwrap_or(0))
  }

  async fn replace_request(
    &self,
    request_id: &str,
    records: Vec<RecommendationRecord>,
  ) -> Result<(), StoreError> {
    check_replacement(request_id, &records)?;

    let mut table = self.table.write().await;
    if !table.provisioned {
      return Err(self.not_provisioned());
    }

    let partition: BTreeMap<_, _> =
      records.into_iter().map(|r| (r.recommended_user_id.clone(), r)).collect();
    if partition.is_empty() {
      table.partitions.remove(request_id);
    } else {
      table.partitions.insert(request_id.to_string(), partition);
    }
    Ok(())
  }

  async fn create_schema(&self) -> Result<(), StoreError> {
    let mut table = self.table.write().await;
    if table.provisioned {
      return Err(StoreError::schema_exists(&self.schema.table_name));
    }

    table.provisioned = true;
    tracing::info!(table = %self.schema.table_name, "created in-memory table");
    Ok(())
  }

  async fn schema_status(&self) -> Result<SchemaStatus, StoreError> {
    let table = self.table.read().await;
    Ok(if table.provisioned { SchemaStatus::Active } else { SchemaStatus::Missing })
  }

  fn schema(&self) -> TableSchema {
    self.schema.clone()
  }
}

/// Drop a record and its partition once empty
fn remove_record(
  partitions: &mut Partitions,
  request_id: &str,
  recommended_user_id: &str,
) -> Option<RecommendationRecord> {
  let partition = partitions.get_mut(request_id)?;
  let removed = partition.remove(recommended_user_id);
  if partition.is_empty() {
    partitions.remove(request_id);
  }
  removed
}
