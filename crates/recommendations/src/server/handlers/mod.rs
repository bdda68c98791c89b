//! REST API handlers

pub mod logs;
pub mod recommendations;
pub mod schema;
pub mod status;

use axum::{http::StatusCode, response::Json};
use matchstore::StoreError;
use uuid::Uuid;

use crate::server::types::{ApiError, BaseResponse};

/// Error half of every handler result
pub type ApiFailure = (StatusCode, Json<BaseResponse<()>>);

pub type ApiResult<T> = Result<Json<BaseResponse<T>>, ApiFailure>;

/// HTTP status for a store failure
pub fn status_for(error: &StoreError) -> StatusCode {
  match error {
    StoreError::InvalidRecord { .. } => StatusCode::BAD_REQUEST,
    StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
    StoreError::SchemaExists { .. } => StatusCode::CONFLICT,
    StoreError::BackendUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
    StoreError::Provisioning { .. } | StoreError::Backend { .. } => {
      StatusCode::INTERNAL_SERVER_ERROR
    }
  }
}

pub fn store_failure(error: &StoreError, transaction_id: Uuid) -> ApiFailure {
  let api_error = ApiError::new(error.key(), &error.to_string());
  (status_for(error), Json(BaseResponse::<()>::error(vec![api_error], transaction_id)))
}
