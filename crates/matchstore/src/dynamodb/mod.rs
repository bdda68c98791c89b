//! DynamoDB backend
//!
//! One table, partition key `request_id`, sort key `recommended_user_id`.
//! Each store call maps to one (or, for partition-wide operations, a handful
//! of) DynamoDB requests with no retries.

pub mod connection;
mod conversions;
mod errors;
pub mod table_manager;

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::Utc;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::record::RecommendationRecord;
use crate::schema::{SchemaStatus, TableSchema, ATTR_RECOMMENDED_USER_ID, ATTR_REQUEST_ID};
use crate::store::{check_replacement, is_addressable, RecommendationStore};
use connection::create_client;
use conversions::{item_to_record, key_item, record_to_item, Item};
use errors::{classify, error_code, CONDITIONAL_CHECK_FAILED};
use table_manager::TableManager;

/// Recommendation store backed by a DynamoDB table
pub struct DynamoDbStore {
  client: Client,
  table_manager: TableManager,
}

impl DynamoDbStore {
  /// Create a store from explicit configuration
  pub fn new(config: &StoreConfig) -> Result<Self> {
    let client = create_client(config)?;
    Ok(Self::with_client(client, config.schema()))
  }

  /// Create a store around an existing client
  pub fn with_client(client: Client, schema: TableSchema) -> Self {
    let table_manager = TableManager::new(client.clone(), schema);
    Self { client, table_manager }
  }

  pub fn table_manager(&self) -> &TableManager {
    &self.table_manager
  }

  fn table_name(&self) -> &str {
    &self.table_manager.schema().table_name
  }

  /// Every item of a partition, following pagination to the end
  async fn query_partition(&self, request_id: &str) -> Result<Vec<Item>, StoreError> {
    let mut items = Vec::new();
    let mut start_key: Option<Item> = None;

    loop {
      let output = self
        .client
        .query()
        .table_name(self.table_name())
        .key_condition_expression("#rid = :rid")
        .expression_attribute_names("#rid", ATTR_REQUEST_ID)
        .expression_attribute_values(":rid", AttributeValue::S(request_id.to_string()))
        .consistent_read(true)
        .set_exclusive_start_key(start_key.take())
        .send()
        .await
        .map_err(|e| classify("Query", e))?;

      items.extend(output.items().iter().cloned());

      match output.last_evaluated_key() {
        Some(key) if !key.is_empty() => start_key = Some(key.clone()),
        _ => break,
      }
    }

    Ok(items)
  }

  async fn delete_item(
    &self,
    request_id: &str,
    recommended_user_id: &str,
  ) -> Result<(), StoreError> {
    self
      .client
      .delete_item()
      .table_name(self.table_name())
      .set_key(Some(key_item(request_id, recommended_user_id)))
      .send()
      .await
      .map_err(|e| classify("DeleteItem", e))?;
    Ok(())
  }
}

#[async_trait]
impl RecommendationStore for DynamoDbStore {
  async fn put(&self, record: RecommendationRecord) -> Result<(), StoreError> {
    record.validate()?;

    self
      .client
      .put_item()
      .table_name(self.table_name())
      .set_item(Some(record_to_item(&record)))
      .send()
      .await
      .map_err(|e| classify("PutItem", e))?;

    tracing::debug!(
      request_id = %record.request_id,
      user = %record.recommended_user_id,
      "stored recommendation"
    );
    Ok(())
  }

  async fn get_by_request(
    &self,
    request_id: &str,
  ) -> Result<Vec<RecommendationRecord>, StoreError> {
    if !is_addressable(request_id) {
      return Ok(Vec::new());
    }

    let now = Utc::now();
    let items = self.query_partition(request_id).await?;

    let mut records = Vec::with_capacity(items.len());
    for item in &items {
      let record = item_to_record(item)?;
      // TTL deletion is lazy, so expired items can still be returned
      if !record.is_expired_at(now) {
        records.push(record);
      }
    }
    Ok(records)
  }

  async fn delete(&self, request_id: &str, recommended_user_id: &str) -> Result<(), StoreError> {
    if !is_addressable(request_id) || !is_addressable(recommended_user_id) {
      return Ok(());
    }
    self.delete_item(request_id, recommended_user_id).await
  }

  async fn delete_expected(
    &self,
    request_id: &str,
    recommended_user_id: &str,
  ) -> Result<(), StoreError> {
    if !is_addressable(request_id) || !is_addressable(recommended_user_id) {
      return Err(StoreError::not_found(request_id, recommended_user_id));
    }

    let result = self
      .client
      .delete_item()
      .table_name(self.table_name())
      .set_key(Some(key_item(request_id, recommended_user_id)))
      .condition_expression("attribute_exists(#rid)")
      .expression_attribute_names("#rid", ATTR_REQUEST_ID)
      .send()
      .await;

    match result {
      Ok(_) => Ok(()),
      Err(err) if error_code(&err) == Some(CONDITIONAL_CHECK_FAILED) => {
        Err(StoreError::not_found(request_id, recommended_user_id))
      }
      Err(err) => Err(classify("DeleteItem", err)),
    }
  }

  async fn delete_request(&self, request_id: &str) -> Result<usize, StoreError> {
    if !is_addressable(request_id) {
      return Ok(0);
    }

    let items = self.query_partition(request_id).await?;

    let mut removed = 0;
    for item in &items {
      let user = match item.get(ATTR_RECOMMENDED_USER_ID) {
        Some(AttributeValue::S(user)) => user,
        _ => continue,
      };
      self.delete_item(request_id, user).await?;
      removed += 1;
    }

    tracing::debug!(request_id = %request_id, removed, "cleared request");
    Ok(removed)
  }

  async fn replace_request(
    &self,
    request_id: &str,
    records: Vec<RecommendationRecord>,
  ) -> Result<(), StoreError> {
    check_replacement(request_id, &records)?;

    // Not atomic: a failure part-way leaves a subset that the caller's retry overwrites
    self.delete_request(request_id).await?;
    for record in records {
      self.put(record).await?;
    }
    Ok(())
  }

  async fn create_schema(&self) -> Result<(), StoreError> {
    self.table_manager.create_table().await.map(|_| ())
  }

  async fn schema_status(&self) -> Result<SchemaStatus, StoreError> {
    self.table_manager.status().await
  }

  fn schema(&self) -> TableSchema {
    self.table_manager.schema().clone()
  }
}
