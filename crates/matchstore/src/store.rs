//! Storage abstraction for recommendation records
//!
//! Higher layers (the REST server, the provisioning CLI) only ever talk to
//! [`RecommendationStore`], so backends can be swapped without touching them.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::config::{BackendKind, StoreConfig};
use crate::dynamodb::DynamoDbStore;
use crate::error::StoreError;
use crate::memory::MemoryStore;
use crate::record::RecommendationRecord;
use crate::schema::{SchemaStatus, TableSchema};

/// Read/write contract of the recommendations table
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait RecommendationStore: Send + Sync {
  /// Insert or overwrite the record stored under its key pair
  async fn put(&self, record: RecommendationRecord) -> Result<(), StoreError>;

  /// All live records of a request in sort-key order; empty when unknown
  async fn get_by_request(&self, request_id: &str) -> Result<Vec<RecommendationRecord>, StoreError>;

  /// Remove one record, succeeding when it is already absent
  async fn delete(&self, request_id: &str, recommended_user_id: &str) -> Result<(), StoreError>;

  /// Remove one record, failing with `NotFound` when it is absent
  async fn delete_expected(
    &self,
    request_id: &str,
    recommended_user_id: &str,
  ) -> Result<(), StoreError>;

  /// Remove every record of a request, returning how many were removed
  async fn delete_request(&self, request_id: &str) -> Result<usize, StoreError>;

  /// Supersede a request's recommendations with a freshly computed set
  async fn replace_request(
    &self,
    request_id: &str,
    records: Vec<RecommendationRecord>,
  ) -> Result<(), StoreError>;

  /// Provision the backing table; `SchemaExists` if it is already there
  async fn create_schema(&self) -> Result<(), StoreError>;

  /// Current provisioning state of the backing table
  async fn schema_status(&self) -> Result<SchemaStatus, StoreError>;

  /// The layout this store provisions
  fn schema(&self) -> TableSchema;
}

/// Open the backend selected by `config`
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn RecommendationStore>> {
  config.validate()?;

  let store: Arc<dyn RecommendationStore> = match config.backend {
    BackendKind::Memory => Arc::new(MemoryStore::with_schema(config.schema())),
    BackendKind::Dynamodb => Arc::new(DynamoDbStore::new(config)?),
  };

  tracing::debug!(
    backend = ?config.backend,
    table = %config.table_name,
    "opened recommendation store"
  );
  Ok(store)
}

/// Poll `schema_status` until the table is active or `timeout` elapses.
///
/// A failed status call ends the wait immediately; only a table that is still
/// creating is polled again.
pub async fn wait_until_active(
  store: &dyn RecommendationStore,
  timeout: Duration,
  interval: Duration,
) -> Result<SchemaStatus, StoreError> {
  let deadline = Instant::now() + timeout;

  loop {
    let status = store.schema_status().await?;
    if status != SchemaStatus::Creating || Instant::now() >= deadline {
      return Ok(status);
    }
    sleep(interval).await;
  }
}

/// Whether an id can address a stored record. Blank ids are rejected on
/// write, so lookups and deletes keyed by one are answered without a backend
/// call: reads are empty, deletes remove nothing.
pub(crate) fn is_addressable(id: &str) -> bool {
  !id.trim().is_empty()
}

/// Shared precondition of `replace_request` across backends
pub(crate) fn check_replacement(
  request_id: &str,
  records: &[RecommendationRecord],
) -> Result<(), StoreError> {
  if !is_addressable(request_id) {
    return Err(StoreError::invalid_record("request_id must not be empty"));
  }
  for record in records {
    record.validate()?;
    if record.request_id != request_id {
      return Err(StoreError::invalid_record(format!(
        "record for request '{}' cannot replace recommendations of '{}'",
        record.request_id, request_id
      )));
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use mockall::Sequence;

  #[tokio::test]
  async fn test_wait_until_active_polls_while_creating() {
    let mut store = MockRecommendationStore::new();
    let mut seq = Sequence::new();
    store
      .expect_schema_status()
      .times(2)
      .in_sequence(&mut seq)
      .returning(|| Ok(SchemaStatus::Creating));
    store
      .expect_schema_status()
      .times(1)
      .in_sequence(&mut seq)
      .returning(|| Ok(SchemaStatus::Active));

    let status =
      wait_until_active(&store, Duration::from_secs(5), Duration::from_millis(1)).await.unwrap();
    assert_eq!(status, SchemaStatus::Active);
  }

  #[tokio::test]
  async fn test_wait_until_active_stops_on_error() {
    let mut store = MockRecommendationStore::new();
    store
      .expect_schema_status()
      .times(1)
      .returning(|| Err(StoreError::backend_unavailable("connection refused")));

    let result = wait_until_active(&store, Duration::from_secs(5), Duration::from_millis(1)).await;
    assert!(matches!(result, Err(StoreError::BackendUnavailable { .. })));
  }

  #[tokio::test]
  async fn test_wait_until_active_gives_up_at_deadline() {
    let mut store = MockRecommendationStore::new();
    store.expect_schema_status().returning(|| Ok(SchemaStatus::Creating));

    let status = wait_until_active(&store, Duration::ZERO, Duration::from_millis(1)).await.unwrap();
    assert_eq!(status, SchemaStatus::Creating);
  }

  #[test]
  fn test_replacement_must_stay_in_partition() {
    let records =
      vec![RecommendationRecord::new("r1", "u1"), RecommendationRecord::new("r2", "u2")];

    let error = check_replacement("r1", &records).unwrap_err();
    assert!(matches!(error, StoreError::InvalidRecord { .. }));
    assert!(check_replacement("r1", &records[..1]).is_ok());
  }

  #[test]
  fn test_blank_ids_are_not_addressable() {
    assert!(!is_addressable(""));
    assert!(!is_addressable("  \t"));
    assert!(is_addressable("r1"));

    let error = check_replacement(" ", &[]).unwrap_err();
    assert!(matches!(error, StoreError::InvalidRecord { .. }));
  }
}
