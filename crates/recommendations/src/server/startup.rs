//! REST server startup and configuration

use anyhow::{anyhow, Result};
use axum::{serve, Router};
use matchstore::RecommendationStore;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::server::{oplog::OperationLog, routing::create_router, state::AppState};

const COMPONENT: &str = "recommendations-server";

/// The full application with tracing and CORS layers applied
pub fn build_app(state: AppState) -> Router {
  create_router(state)
    .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
}

/// Start the REST server and serve until it stops
pub async fn start_server(
  addr: SocketAddr,
  store: Arc<dyn RecommendationStore>,
  logs: Arc<OperationLog>,
) -> Result<()> {
  let table = store.schema().table_name;
  logs
    .info(&format!("Starting recommendations REST server on {addr} (table {table})"), COMPONENT)
    .await;

  let app = build_app(AppState::with_logs(store, logs.clone()));

  let listener = TcpListener::bind(addr).await?;
  logs.info(&format!("Server listening on {}", listener.local_addr()?), COMPONENT).await;

  match serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
    Ok(()) => {
      logs.info("Server shutdown gracefully", COMPONENT).await;
      Ok(())
    }
    Err(e) => {
      logs.error(&format!("Server error: {e}"), COMPONENT).await;
      Err(anyhow!("Server error: {e}"))
    }
  }
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::warn!("Failed to listen for shutdown signal: {e}");
    std::future::pending::<()>().await;
  }
}
