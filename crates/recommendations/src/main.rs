use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use matchstore::StoreArgs;
use recommendations::cli::commands;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "recommendations")]
#[command(
  about = "Recommendations - Matching Recommendation Store\nProvision the lookup table and inspect stored recommendations"
)]
#[command(version)]
struct Cli {
  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

/// Key of a single recommendation
#[derive(Args)]
struct RecommendationKey {
  /// Matching request id
  request_id: String,
  /// Recommended user id
  user_id: String,
}

#[derive(Subcommand)]
enum Command {
  /// Create the recommendations table on the configured backend
  Provision {
    #[command(flatten)]
    store: StoreArgs,
    /// Succeed when the table already exists
    #[arg(long)]
    if_missing: bool,
    /// Wait up to this many seconds for the table to become active
    #[arg(long, value_name = "SECS")]
    wait: Option<u64>,
  },
  /// Store a recommendation
  Put {
    #[command(flatten)]
    key: RecommendationKey,
    /// Match score, higher is better
    #[arg(short, long)]
    score: Option<f64>,
    /// Seconds until the recommendation expires
    #[arg(long)]
    ttl_secs: Option<i64>,
  },
  /// List recommendations for a request
  Get {
    /// Matching request id
    request_id: String,
    /// Order by score, best first
    #[arg(short, long)]
    ranked: bool,
  },
  /// Delete one recommendation
  Delete {
    #[command(flatten)]
    key: RecommendationKey,
    /// Fail if the recommendation does not exist
    #[arg(long)]
    expect: bool,
  },
  /// Delete every recommendation of a request
  Clear {
    /// Matching request id
    request_id: String,
  },
  /// Query server logs for debugging and monitoring
  Logs {
    /// Maximum number of log entries to return
    #[arg(short, long, default_value = "50")]
    limit: usize,
    /// Filter by log level (info, success, warn, error, all)
    #[arg(long, default_value = "all")]
    level: String,
  },
}

async fn handle(command: Command) -> Result<()> {
  match command {
    Command::Provision { store, if_missing, wait } => {
      commands::provision(store.into_config()?, if_missing, wait).await
    }
    Command::Put { key, score, ttl_secs } => {
      commands::put(&key.request_id, &key.user_id, score, ttl_secs).await
    }
    Command::Get { request_id, ranked } => commands::get(&request_id, ranked).await,
    Command::Delete { key, expect } => {
      commands::delete(&key.request_id, &key.user_id, expect).await
    }
    Command::Clear { request_id } => commands::clear(&request_id).await,
    Command::Logs { limit, level } => commands::logs(limit, &level).await,
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug,hyper=info,aws_smithy_runtime=info")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(filter)
    .init();

  handle(cli.command).await
}
