//! Recommendations REST Server
//!
//! HTTP REST API in front of the matching recommendation store, used by the
//! admin dashboard and the mobile client.

use anyhow::{anyhow, Result};
use clap::Parser;
use matchstore::{open_store, StoreArgs, StoreError};
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use recommendations::server::{oplog::OperationLog, startup::start_server};

#[derive(Parser)]
#[command(name = "recommendations_server")]
#[command(about = "Recommendations REST API Server")]
#[command(version)]
struct Args {
  /// Server bind address
  #[arg(long, env = "RECOMMENDATIONS_BIND", default_value = "127.0.0.1:3000")]
  bind: SocketAddr,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,

  /// Create the table at startup; an existing table is fine
  #[arg(long)]
  provision: bool,

  /// Entries kept in the in-memory operation log
  #[arg(long, default_value_t = recommendations::server::oplog::DEFAULT_CAPACITY)]
  log_capacity: usize,

  #[command(flatten)]
  store: StoreArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let filter = if args.verbose {
    EnvFilter::new("debug,hyper=info,aws_smithy_runtime=info")
  } else {
    EnvFilter::new("recommendations=info,matchstore=info,tower_http=warn,warn")
  };
  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  tracing::info!("Starting Recommendations REST Server v{}", env!("CARGO_PKG_VERSION"));
  tracing::info!("Binding to address: {}", args.bind);

  let config = args.store.into_config()?;
  let store = open_store(&config).await?;
  let logs = Arc::new(OperationLog::new(args.log_capacity));

  if args.provision {
    match store.create_schema().await {
      Ok(()) => logs.success(&format!("Provisioned table {}", config.table_name), "startup").await,
      Err(StoreError::SchemaExists { table }) => {
        logs.info(&format!("Table {table} already exists"), "startup").await
      }
      Err(e) => return Err(anyhow!("Provisioning failed: {e}")),
    }
  }

  start_server(args.bind, store, logs).await
}
