//! Table provisioning endpoint handlers

use axum::{
  extract::{Extension, State},
  response::Json,
};
use chrono::Utc;
use matchstore::SchemaStatus;

use crate::server::handlers::{store_failure, ApiResult};
use crate::server::{
  middleware::RequestContext,
  state::AppState,
  types::{BaseResponse, SchemaResponse},
};

const COMPONENT: &str = "schema-api";

/// POST /schema - Create the recommendations table
pub async fn create_schema(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
) -> ApiResult<SchemaResponse> {
  let schema = state.store.schema();

  if let Err(e) = state.store.create_schema().await {
    context.log_error(&format!("Provisioning {} failed: {e}", schema.table_name), COMPONENT).await;
    return Err(store_failure(&e, context.request_id));
  }

  // The table exists at this point even if describing it fails
  let status = match state.store.schema_status().await {
    Ok(status) => status,
    Err(e) => {
      context.log_warn(&format!("Table created but status check failed: {e}"), COMPONENT).await;
      SchemaStatus::Creating
    }
  };

  context
    .log_success(&format!("Provisioned table {} ({status})", schema.table_name), COMPONENT)
    .await;
  let response = SchemaResponse { schema, status, checked_at: Utc::now() };
  Ok(Json(BaseResponse::success(response, context.request_id)))
}

/// GET /schema - Report the table layout and its provisioning state
pub async fn get_schema(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
) -> ApiResult<SchemaResponse> {
  match state.store.schema_status().await {
    Ok(status) => {
      let response =
        SchemaResponse { schema: state.store.schema(), status, checked_at: Utc::now() };
      Ok(Json(BaseResponse::success(response, context.request_id)))
    }
    Err(e) => {
      context.log_error(&format!("Failed to describe table: {e}"), COMPONENT).await;
      Err(store_failure(&e, context.request_id))
    }
  }
}
