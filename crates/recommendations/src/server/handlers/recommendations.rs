//! Recommendation endpoint handlers

use axum::{
  extract::{Extension, Json, Path, Query, State},
  response::Json as ResponseJson,
};

use crate::server::handlers::{store_failure, ApiResult};
use crate::server::{
  middleware::RequestContext,
  state::AppState,
  types::{
    BaseResponse, ClearResponse, DeleteRecommendationQuery, GetRecommendationsQuery,
    PutRecommendationRequest, RecommendationResponse, RecommendationsResponse,
    ReplaceRecommendationsRequest,
  },
};

const COMPONENT: &str = "recommendations-api";

/// POST /recommendations - Store one recommendation, overwriting any existing pair
pub async fn put_recommendation(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(request): Json<PutRecommendationRequest>,
) -> ApiResult<RecommendationResponse> {
  let record = match request.into_record() {
    Ok(record) => record,
    Err(e) => {
      context.log_error(&format!("Rejected recommendation: {e}"), COMPONENT).await;
      return Err(store_failure(&e, context.request_id));
    }
  };

  match state.store.put(record.clone()).await {
    Ok(()) => {
      context
        .log_success(
          &format!("Stored recommendation {}/{}", record.request_id, record.recommended_user_id),
          COMPONENT,
        )
        .await;
      let response = RecommendationResponse { recommendation: record };
      Ok(ResponseJson(BaseResponse::success(response, context.request_id)))
    }
    Err(e) => {
      context.log_error(&format!("Failed to store recommendation: {e}"), COMPONENT).await;
      Err(store_failure(&e, context.request_id))
    }
  }
}

/// GET /recommendations/{request_id} - All live recommendations for a request
pub async fn get_recommendations(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Path(request_id): Path<String>,
  Query(query): Query<GetRecommendationsQuery>,
) -> ApiResult<RecommendationsResponse> {
  match state.store.get_by_request(&request_id).await {
    Ok(records) => {
      let recommendations = if query.ranked { matchstore::ranked(records) } else { records };
      context
        .log_info(
          &format!("Found {} recommendations for {request_id}", recommendations.len()),
          COMPONENT,
        )
        .await;
      let response =
        RecommendationsResponse { request_id, count: recommendations.len(), recommendations };
      Ok(ResponseJson(BaseResponse::success(response, context.request_id)))
    }
    Err(e) => {
      context.log_error(&format!("Failed to read recommendations: {e}"), COMPONENT).await;
      Err(store_failure(&e, context.request_id))
    }
  }
}

/// PUT /recommendations/{request_id} - Replace the whole recommendation set of a request
pub async fn replace_recommendations(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Path(request_id): Path<String>,
  Json(request): Json<ReplaceRecommendationsRequest>,
) -> ApiResult<RecommendationsResponse> {
  let records: Vec<_> = match request
    .recommendations
    .into_iter()
    .map(|c| c.into_record(request_id.clone()))
    .collect::<Result<_, _>>()
  {
    Ok(records) => records,
    Err(e) => {
      context.log_error(&format!("Rejected replacement set: {e}"), COMPONENT).await;
      return Err(store_failure(&e, context.request_id));
    }
  };

  match state.store.replace_request(&request_id, records.clone()).await {
    Ok(()) => {
      context
        .log_success(
          &format!("Replaced recommendations for {request_id} with {} entries", records.len()),
          COMPONENT,
        )
        .await;
      let response =
        RecommendationsResponse { request_id, count: records.len(), recommendations: records };
      Ok(ResponseJson(BaseResponse::success(response, context.request_id)))
    }
    Err(e) => {
      context.log_error(&format!("Failed to replace recommendations: {e}"), COMPONENT).await;
      Err(store_failure(&e, context.request_id))
    }
  }
}

/// DELETE /recommendations/{request_id} - Remove every recommendation of a request
pub async fn clear_recommendations(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Path(request_id): Path<String>,
) -> ApiResult<ClearResponse> {
  match state.store.delete_request(&request_id).await {
    Ok(removed) => {
      context
        .log_success(&format!("Removed {removed} recommendations for {request_id}"), COMPONENT)
        .await;
      let response = ClearResponse { request_id, removed };
      Ok(ResponseJson(BaseResponse::success(response, context.request_id)))
    }
    Err(e) => {
      context.log_error(&format!("Failed to clear recommendations: {e}"), COMPONENT).await;
      Err(store_failure(&e, context.request_id))
    }
  }
}

/// DELETE /recommendations/{request_id}/{user_id} - Remove one recommendation.
/// Idempotent unless `?expect=true` is given.
pub async fn delete_recommendation(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Path((request_id, user_id)): Path<(String, String)>,
  Query(query): Query<DeleteRecommendationQuery>,
) -> ApiResult<()> {
  let result = if query.expect {
    state.store.delete_expected(&request_id, &user_id).await
  } else {
    state.store.delete(&request_id, &user_id).await
  };

  match result {
    Ok(()) => {
      context
        .log_success(&format!("Deleted recommendation {request_id}/{user_id}"), COMPONENT)
        .await;
      Ok(ResponseJson(BaseResponse::success((), context.request_id)))
    }
    Err(e) => {
      context.log_warn(&format!("Failed to delete recommendation: {e}"), COMPONENT).await;
      Err(store_failure(&e, context.request_id))
    }
  }
}
