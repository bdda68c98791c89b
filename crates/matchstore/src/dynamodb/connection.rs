//! DynamoDB client construction

use anyhow::{anyhow, Result};
use aws_sdk_dynamodb::config::{
  retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, Credentials, Region,
};
use aws_sdk_dynamodb::{Client, Config};
use std::time::Duration;

use crate::config::StoreConfig;

const CREDENTIALS_PROVIDER: &str = "matchstore-static";

/// Build a DynamoDB client from explicit configuration.
///
/// SDK retries are disabled: every store call is a single attempt and the
/// caller decides whether to back off and try again.
pub fn create_client(config: &StoreConfig) -> Result<Client> {
  let region = config.region.clone().ok_or_else(|| anyhow!("DynamoDB client requires a region"))?;
  let access_key_id =
    config
      .access_key_id
      .clone()
      .ok_or_else(|| anyhow!("DynamoDB client requires an access key id"))?;
  let secret_access_key = config
    .secret_access_key
    .clone()
    .ok_or_else(|| anyhow!("DynamoDB client requires a secret access key"))?;

  let credentials = Credentials::new(
    access_key_id,
    secret_access_key,
    config.session_token.clone(),
    None,
    CREDENTIALS_PROVIDER,
  );

  let timeouts = TimeoutConfig::builder()
    .operation_timeout(Duration::from_secs(config.operation_timeout_secs))
    .build();

  let mut builder = Config::builder()
    .behavior_version(BehaviorVersion::latest())
    .region(Region::new(region))
    .credentials_provider(credentials)
    .retry_config(RetryConfig::disabled())
    .timeout_config(timeouts);

  if let Some(endpoint_url) = &config.endpoint_url {
    builder = builder.endpoint_url(endpoint_url);
  }

  Ok(Client::from_conf(builder.build()))
}
