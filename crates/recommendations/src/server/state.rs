//! Shared application state for the REST handlers

use matchstore::RecommendationStore;
use std::sync::Arc;

use crate::server::oplog::OperationLog;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn RecommendationStore>,
  pub logs: Arc<OperationLog>,
}

impl AppState {
  pub fn new(store: Arc<dyn RecommendationStore>) -> Self {
    Self { store, logs: Arc::new(OperationLog::default()) }
  }

  pub fn with_logs(store: Arc<dyn RecommendationStore>, logs: Arc<OperationLog>) -> Self {
    Self { store, logs }
  }
}
