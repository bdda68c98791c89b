use anyhow::{anyhow, Result};
use colored::*;
use matchstore::{open_store, wait_until_active, SchemaStatus, StoreConfig, StoreError};
use std::time::Duration;

use crate::cli::client::get_client;
use crate::cli::display::{colored_status, display_log_entry, format_recommendation};

const WAIT_INTERVAL: Duration = Duration::from_secs(2);

/// Create the recommendations table directly against the configured backend
pub async fn provision(
  config: StoreConfig,
  if_missing: bool,
  wait_secs: Option<u64>,
) -> Result<()> {
  let store = open_store(&config).await?;
  let schema = store.schema();

  match store.create_schema().await {
    Ok(()) => println!("{} Created table {}", "✓".green(), schema.table_name.cyan()),
    Err(StoreError::SchemaExists { table }) if if_missing => {
      println!("{} Table {} already exists", "•".yellow(), table.cyan())
    }
    Err(e) => return Err(anyhow!("Provisioning failed: {e}")),
  }

  let status = match wait_secs {
    Some(secs) => {
      wait_until_active(store.as_ref(), Duration::from_secs(secs), WAIT_INTERVAL).await?
    }
    None => store.schema_status().await?,
  };

  println!();
  println!("{schema}");
  println!("  Status:        {}", colored_status(&status));

  if wait_secs.is_some() && status != SchemaStatus::Active {
    return Err(anyhow!("Table {} did not become active (status: {status})", schema.table_name));
  }

  Ok(())
}

pub async fn put(
  request_id: &str,
  recommended_user_id: &str,
  score: Option<f64>,
  ttl_secs: Option<i64>,
) -> Result<()> {
  let client = get_client()?;
  client.put(request_id, recommended_user_id, score, ttl_secs).await?;

  println!(
    "{} Stored recommendation {}/{}",
    "✓".green(),
    request_id.cyan(),
    recommended_user_id.yellow()
  );
  Ok(())
}

pub async fn get(request_id: &str, ranked: bool) -> Result<()> {
  let client = get_client()?;
  let response = client.get(request_id, ranked).await?;

  if response.recommendations.is_empty() {
    println!("No recommendations found for request: {}", request_id.yellow());
    return Ok(());
  }

  println!("{} {} ({} recommendations)", "📋".cyan(), request_id.blue().bold(), response.count);
  for record in &response.recommendations {
    println!("  {}", format_recommendation(record));
  }

  Ok(())
}

pub async fn delete(request_id: &str, recommended_user_id: &str, expect: bool) -> Result<()> {
  let client = get_client()?;
  client.delete(request_id, recommended_user_id, expect).await?;

  println!(
    "{} Deleted recommendation {}/{}",
    "✓".green(),
    request_id.cyan(),
    recommended_user_id.yellow()
  );
  Ok(())
}

pub async fn clear(request_id: &str) -> Result<()> {
  let client = get_client()?;
  let response = client.clear(request_id).await?;

  println!(
    "{} Removed {} recommendations for {}",
    "✓".green(),
    response.removed,
    request_id.cyan()
  );
  Ok(())
}

pub async fn logs(limit: usize, level: &str) -> Result<()> {
  let client = get_client()?;
  let response = client.logs(Some(limit), Some(level)).await?;

  if response.logs.is_empty() {
    println!("No logs found.");
    return Ok(());
  }

  for entry in &response.logs {
    display_log_entry(entry);
  }

  Ok(())
}
