use axum::{
  body::{to_bytes, Body},
  http::{Request, StatusCode},
  Router,
};
use matchstore::{MemoryStore, RecommendationStore};
use recommendations::server::{routing::create_router, state::AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn provisioned_app() -> (Router, AppState) {
  let state = AppState::new(Arc::new(MemoryStore::provisioned()));
  (create_router(state.clone()), state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let request = match body {
    Some(body) => builder
      .header("content-type", "application/json")
      .body(Body::from(body.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let response = app.clone().oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

fn user_ids(body: &Value) -> Vec<String> {
  body["recommendations"]
    .as_array()
    .unwrap()
    .iter()
    .map(|r| r["recommended_user_id"].as_str().unwrap().to_string())
    .collect()
}

#[tokio::test]
async fn test_put_then_get_returns_stored_recommendations() {
  let (app, _) = provisioned_app();

  for (user, score) in [("u2", 0.4), ("u1", 0.9)] {
    let (status, body) = send(
      &app,
      "POST",
      "/recommendations",
      Some(json!({ "request_id": "r1", "recommended_user_id": user, "score": score })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["recommendation"]["recommended_user_id"], user);
  }

  let (status, body) = send(&app, "GET", "/recommendations/r1", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["count"], 2);
  assert_eq!(user_ids(&body), vec!["u1", "u2"]);
  assert!(body["transaction_id"].is_string());
  assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn test_get_unknown_request_is_empty_not_an_error() {
  let (app, _) = provisioned_app();

  let (status, body) = send(&app, "GET", "/recommendations/nobody", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_ranked_query_orders_by_score() {
  let (app, state) = provisioned_app();
  for (user, score) in [("a", 0.1), ("b", 0.8), ("c", 0.5)] {
    state
      .store
      .put(matchstore::RecommendationRecord::new("r1", user).with_score(score))
      .await
      .unwrap();
  }

  let (_, body) = send(&app, "GET", "/recommendations/r1?ranked=true", None).await;
  assert_eq!(user_ids(&body), vec!["b", "c", "a"]);
}

#[tokio::test]
async fn test_put_with_empty_user_id_is_bad_request() {
  let (app, _) = provisioned_app();

  let (status, body) = send(
    &app,
    "POST",
    "/recommendations",
    Some(json!({ "request_id": "r1", "recommended_user_id": "" })),
  )
  .await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errors"][0]["key"], "invalid_record");
}

#[tokio::test]
async fn test_put_with_unbounded_ttl_is_bad_request() {
  let (app, _) = provisioned_app();

  let (status, body) = send(
    &app,
    "POST",
    "/recommendations",
    Some(json!({ "request_id": "r1", "recommended_user_id": "u1", "ttl_secs": i64::MAX })),
  )
  .await;

  assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
  assert_eq!(body["errors"][0]["key"], "invalid_record");

  let (_, body) = send(&app, "GET", "/recommendations/r1", None).await;
  assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_replace_with_unbounded_ttl_keeps_existing_set() {
  let (app, state) = provisioned_app();
  state.store.put(matchstore::RecommendationRecord::new("r1", "old1")).await.unwrap();

  let (status, body) = send(
    &app,
    "PUT",
    "/recommendations/r1",
    Some(json!({ "recommendations": [
      { "recommended_user_id": "new1" },
      { "recommended_user_id": "new2", "ttl_secs": i64::MIN }
    ] })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
  assert_eq!(body["errors"][0]["key"], "invalid_record");

  let (_, body) = send(&app, "GET", "/recommendations/r1", None).await;
  assert_eq!(user_ids(&body), vec!["old1"]);
}

#[tokio::test]
async fn test_put_with_unstorable_score_is_bad_request() {
  let (app, _) = provisioned_app();

  let (status, body) = send(
    &app,
    "POST",
    "/recommendations",
    Some(json!({ "request_id": "r1", "recommended_user_id": "u1", "score": 1e200 })),
  )
  .await;

  assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
  assert_eq!(body["errors"][0]["key"], "invalid_record");
}

#[tokio::test]
async fn test_delete_is_idempotent_unless_expected() {
  let (app, state) = provisioned_app();
  state.store.put(matchstore::RecommendationRecord::new("r1", "u1")).await.unwrap();

  let (status, _) = send(&app, "DELETE", "/recommendations/r1/u1", None).await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = send(&app, "DELETE", "/recommendations/r1/u1", None).await;
  assert_eq!(status, StatusCode::OK);

  let (status, body) = send(&app, "DELETE", "/recommendations/r1/u1?expect=true", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["errors"][0]["key"], "recommendation_not_found");
}

#[tokio::test]
async fn test_replace_swaps_the_whole_set() {
  let (app, state) = provisioned_app();
  for user in ["old1", "old2"] {
    state.store.put(matchstore::RecommendationRecord::new("r1", user)).await.unwrap();
  }

  let (status, body) = send(
    &app,
    "PUT",
    "/recommendations/r1",
    Some(json!({ "recommendations": [
      { "recommended_user_id": "new1", "score": 0.7 },
      { "recommended_user_id": "new2" }
    ] })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{body}");

  let (_, body) = send(&app, "GET", "/recommendations/r1", None).await;
  assert_eq!(user_ids(&body), vec!["new1", "new2"]);
}

#[tokio::test]
async fn test_clear_reports_removed_count() {
  let (app, state) = provisioned_app();
  for user in ["u1", "u2", "u3"] {
    state.store.put(matchstore::RecommendationRecord::new("r1", user)).await.unwrap();
  }
  state.store.put(matchstore::RecommendationRecord::new("r2", "u1")).await.unwrap();

  let (status, body) = send(&app, "DELETE", "/recommendations/r1", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["removed"], 3);

  let (_, body) = send(&app, "GET", "/recommendations/r2", None).await;
  assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_schema_lifecycle() {
  let state = AppState::new(Arc::new(MemoryStore::new()));
  let app = create_router(state);

  let (status, body) = send(&app, "GET", "/schema", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"]["state"], "missing");

  let (status, _) = send(
    &app,
    "POST",
    "/recommendations",
    Some(json!({ "request_id": "r1", "recommended_user_id": "u1" })),
  )
  .await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

  let (status, body) = send(&app, "POST", "/schema", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"]["state"], "active");
  assert_eq!(body["schema"]["table_name"], "MatchingRecommendations");
  assert_eq!(body["schema"]["partition_key"], "request_id");
  assert_eq!(body["schema"]["sort_key"], "recommended_user_id");
  assert_eq!(body["schema"]["read_capacity"], 5);
  assert_eq!(body["schema"]["write_capacity"], 5);

  let (status, body) = send(&app, "POST", "/schema", None).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["errors"][0]["key"], "schema_exists");
}

#[tokio::test]
async fn test_requests_are_recorded_in_operation_log() {
  let (app, _) = provisioned_app();
  send(&app, "GET", "/recommendations/r1", None).await;

  let (status, body) = send(&app, "GET", "/logs?level=info", None).await;
  assert_eq!(status, StatusCode::OK);

  let logs = body["logs"].as_array().unwrap();
  assert!(logs.iter().any(|entry| {
    entry["message"] == "Request completed"
      && entry["context"]["path"] == "/recommendations/r1"
      && entry["context"]["status_code"] == 200
  }));
}

#[tokio::test]
async fn test_status_and_version() {
  let (app, _) = provisioned_app();

  let (status, body) = send(&app, "GET", "/status", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "healthy");
  assert_eq!(body["table_name"], "MatchingRecommendations");
  assert_eq!(body["schema_status"]["state"], "active");

  let (_, body) = send(&app, "GET", "/version", None).await;
  assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
  assert_eq!(body["versioning"]["latest"], env!("CARGO_PKG_VERSION"));
}
