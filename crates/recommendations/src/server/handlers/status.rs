//! Status and version endpoint handlers

use axum::{
  extract::{Extension, State},
  response::Json,
};
use uuid::Uuid;

use crate::server::handlers::{store_failure, ApiResult};
use crate::server::{
  middleware::RequestContext,
  state::AppState,
  types::{BaseResponse, StatusResponse, VersionResponse},
};

/// GET /status - Health check endpoint, including the table state
pub async fn status(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
) -> ApiResult<StatusResponse> {
  let version = env!("CARGO_PKG_VERSION");

  match state.store.schema_status().await {
    Ok(schema_status) => {
      let response = StatusResponse {
        status: "healthy".to_string(),
        table_name: state.store.schema().table_name,
        schema_status,
        version: version.to_string(),
      };
      Ok(Json(BaseResponse::success(response, context.request_id)))
    }
    Err(e) => {
      context.log_warn(&format!("Health check could not reach the store: {e}"), "status-api").await;
      Err(store_failure(&e, context.request_id))
    }
  }
}

/// GET /version - Returns current API version
pub async fn version() -> Json<BaseResponse<VersionResponse>> {
  let transaction_id = Uuid::new_v4();
  let version = env!("CARGO_PKG_VERSION");
  let response = VersionResponse { version: version.to_string() };

  Json(BaseResponse::success(response, transaction_id))
}
