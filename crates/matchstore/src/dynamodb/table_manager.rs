//! Table provisioning for the DynamoDB backend

use aws_sdk_dynamodb::types::{
  AttributeDefinition, KeySchemaElement, KeyType, ProvisionedThroughput, ScalarAttributeType,
  TableDescription, TableStatus,
};
use aws_sdk_dynamodb::Client;

use super::errors::{classify, classify_provisioning, error_code, RESOURCE_NOT_FOUND};
use crate::error::StoreError;
use crate::schema::{SchemaStatus, TableSchema, TableSummary};

/// Creates and inspects the recommendations table
pub struct TableManager {
  client: Client,
  schema: TableSchema,
}

impl TableManager {
  pub fn new(client: Client, schema: TableSchema) -> Self {
    Self { client, schema }
  }

  pub fn schema(&self) -> &TableSchema {
    &self.schema
  }

  /// Issue a single `CreateTable` call for the two-key schema
  pub async fn create_table(&self) -> Result<TableSummary, StoreError> {
    let table = &self.schema.table_name;

    let output = self
      .client
      .create_table()
      .table_name(table)
      .key_schema(key_element(&self.schema.partition_key, KeyType::Hash)?)
      .key_schema(key_element(&self.schema.sort_key, KeyType::Range)?)
      .attribute_definitions(string_attribute(&self.schema.partition_key)?)
      .attribute_definitions(string_attribute(&self.schema.sort_key)?)
      .provisioned_throughput(self.throughput()?)
      .send()
      .await;

    match output {
      Ok(output) => {
        let summary = self.summarize(output.table_description());
        tracing::info!(table = %table, status = %summary.status, "created table");
        Ok(summary)
      }
      Err(err) => {
        let error = classify_provisioning(table, err);
        tracing::error!(table = %table, error = %error, "unable to create table");
        Err(error)
      }
    }
  }

  /// Describe the table, `None` when it does not exist
  pub async fn describe(&self) -> Result<Option<TableSummary>, StoreError> {
    let output = self.client.describe_table().table_name(&self.schema.table_name).send().await;

    match output {
      Ok(output) => Ok(Some(self.summarize(output.table()))),
      Err(err) if error_code(&err) == Some(RESOURCE_NOT_FOUND) => Ok(None),
      Err(err) => Err(classify("DescribeTable", err)),
    }
  }

  pub async fn status(&self) -> Result<SchemaStatus, StoreError> {
    Ok(self.describe().await?.map(|summary| summary.status).unwrap_or(SchemaStatus::Missing))
  }

  fn throughput(&self) -> Result<ProvisionedThroughput, StoreError> {
    ProvisionedThroughput::builder()
      .read_capacity_units(self.schema.read_capacity)
      .write_capacity_units(self.schema.write_capacity)
      .build()
      .map_err(|e| StoreError::provisioning(format!("invalid throughput: {e}")))
  }

  fn summarize(&self, description: Option<&TableDescription>) -> TableSummary {
    let status = match description.and_then(|d| d.table_status()) {
      Some(TableStatus::Active) => SchemaStatus::Active,
      Some(TableStatus::Creating) => SchemaStatus::Creating,
      Some(other) => SchemaStatus::Other(other.as_str().to_string()),
      None => SchemaStatus::Other("UNKNOWN".to_string()),
    };

    TableSummary {
      schema: self.schema.clone(),
      status,
      table_arn: description.and_then(|d| d.table_arn()).map(str::to_string),
    }
  }
}

fn key_element(attribute: &str, key_type: KeyType) -> Result<KeySchemaElement, StoreError> {
  KeySchemaElement::builder()
    .attribute_name(attribute)
    .key_type(key_type)
    .build()
    .map_err(|e| StoreError::provisioning(format!("invalid key schema for {attribute}: {e}")))
}

fn string_attribute(attribute: &str) -> Result<AttributeDefinition, StoreError> {
  AttributeDefinition::builder()
    .attribute_name(attribute)
    .attribute_type(ScalarAttributeType::S)
    .build()
    .map_err(|e| StoreError::provisioning(format!("invalid attribute {attribute}: {e}")))
}
