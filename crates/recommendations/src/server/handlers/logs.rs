//! Logs endpoint handler

use axum::{
  extract::{Extension, Query},
  response::Json,
};

use crate::server::{
  middleware::RequestContext,
  types::{BaseResponse, LogsQuery, LogsResponse},
};

const DEFAULT_LIMIT: usize = 100;

/// GET /logs - Recent operation log entries, oldest first
pub async fn get_logs(
  Extension(context): Extension<RequestContext>,
  Query(query): Query<LogsQuery>,
) -> Json<BaseResponse<LogsResponse>> {
  let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
  let logs = context.logger.get_logs(Some(limit), query.level.as_deref()).await;

  Json(BaseResponse::success(LogsResponse { logs }, context.request_id))
}
