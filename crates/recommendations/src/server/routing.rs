//! Axum router configuration for all endpoints

use axum::{
  middleware,
  routing::{delete, get, post},
  Router,
};

use crate::server::{
  handlers::{logs, recommendations, schema, status},
  middleware::request_context_middleware,
  state::AppState,
};

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
  Router::new()
    // Status and version endpoints
    .route("/status", get(status::status))
    .route("/version", get(status::version))
    // Logs endpoint
    .route("/logs", get(logs::get_logs))
    // Table provisioning
    .route("/schema", get(schema::get_schema).post(schema::create_schema))
    // Recommendation endpoints
    .route("/recommendations", post(recommendations::put_recommendation))
    .route(
      "/recommendations/{request_id}",
      get(recommendations::get_recommendations)
        .put(recommendations::replace_recommendations)
        .delete(recommendations::clear_recommendations),
    )
    .route(
      "/recommendations/{request_id}/{user_id}",
      delete(recommendations::delete_recommendation),
    )
    .layer(middleware::from_fn_with_state(state.clone(), request_context_middleware))
    .with_state(state)
}
