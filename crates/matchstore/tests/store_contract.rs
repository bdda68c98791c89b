use matchstore::{
  ranked, MemoryStore, RecommendationRecord, RecommendationStore, SchemaStatus, StoreError,
};
use std::collections::BTreeSet;
use std::sync::Arc;

async fn provisioned_store() -> MemoryStore {
  let store = MemoryStore::new();
  store.create_schema().await.expect("fresh store provisions");
  store
}

fn user_ids(records: &[RecommendationRecord]) -> BTreeSet<String> {
  records.iter().map(|r| r.recommended_user_id.clone()).collect()
}

#[tokio::test]
async fn test_put_then_get_returns_exactly_one_record_per_pair() {
  let store = provisioned_store().await;
  let pairs = [("r1", "u1"), ("r1", "u2"), ("r2", "u1"), ("request-with-dash", "user:42")];

  for (request_id, user_id) in pairs {
    store.put(RecommendationRecord::new(request_id, user_id)).await.unwrap();
  }

  for (request_id, user_id) in pairs {
    let records = store.get_by_request(request_id).await.unwrap();
    let matching = records.iter().filter(|r| r.key() == (request_id, user_id)).count();
    assert_eq!(matching, 1, "pair ({request_id}, {user_id})");
  }
}

#[tokio::test]
async fn test_two_recommendations_for_one_request() {
  let store = provisioned_store().await;
  store.put(RecommendationRecord::new("r1", "u1")).await.unwrap();
  store.put(RecommendationRecord::new("r1", "u2")).await.unwrap();

  let records = store.get_by_request("r1").await.unwrap();
  assert_eq!(user_ids(&records), BTreeSet::from(["u1".to_string(), "u2".to_string()]));
  assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_put_is_idempotent() {
  let store = provisioned_store().await;
  let record = RecommendationRecord::new("r1", "u1").with_score(0.8);

  store.put(record.clone()).await.unwrap();
  let once = store.get_by_request("r1").await.unwrap();

  store.put(record.clone()).await.unwrap();
  let twice = store.get_by_request("r1").await.unwrap();

  assert_eq!(once, twice);
  assert_eq!(twice, vec![record]);
}

#[tokio::test]
async fn test_put_overwrites_payload_for_same_pair() {
  let store = provisioned_store().await;
  store.put(RecommendationRecord::new("r1", "u1").with_score(0.1)).await.unwrap();
  store.put(RecommendationRecord::new("r1", "u1").with_score(0.9)).await.unwrap();

  let records = store.get_by_request("r1").await.unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].score, Some(0.9));
}

#[tokio::test]
async fn test_unknown_request_reads_as_empty() {
  let store = provisioned_store().await;
  store.put(RecommendationRecord::new("r1", "u1")).await.unwrap();

  let records = store.get_by_request("never-seen").await.unwrap();
  assert!(records.is_empty());
}

#[tokio::test]
async fn test_delete_excludes_pair_and_tolerates_absence() {
  let store = provisioned_store().await;
  store.put(RecommendationRecord::new("r1", "u1")).await.unwrap();
  store.put(RecommendationRecord::new("r1", "u2")).await.unwrap();

  store.delete("r1", "u1").await.unwrap();
  let records = store.get_by_request("r1").await.unwrap();
  assert_eq!(user_ids(&records), BTreeSet::from(["u2".to_string()]));

  store.delete("r1", "u1").await.unwrap();
  store.delete("nobody", "nothing").await.unwrap();
}

#[tokio::test]
async fn test_delete_expected_reports_missing_pair() {
  let store = provisioned_store().await;
  store.put(RecommendationRecord::new("r1", "u1")).await.unwrap();

  store.delete_expected("r1", "u1").await.unwrap();
  let error = store.delete_expected("r1", "u1").await.unwrap_err();
  assert_eq!(error, StoreError::not_found("r1", "u1"));
}

#[tokio::test]
async fn test_create_schema_twice_keeps_first_definition() {
  let store = MemoryStore::new();
  store.create_schema().await.unwrap();
  store.put(RecommendationRecord::new("r1", "u1")).await.unwrap();
  let schema_before = store.schema();

  let error = store.create_schema().await.unwrap_err();
  assert_eq!(error, StoreError::schema_exists("MatchingRecommendations"));

  assert_eq!(store.schema(), schema_before);
  assert_eq!(store.schema_status().await.unwrap(), SchemaStatus::Active);
  assert_eq!(store.get_by_request("r1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_reads_come_back_in_sort_key_order() {
  let store = provisioned_store().await;
  for user in ["u3", "u1", "u2"] {
    store.put(RecommendationRecord::new("r1", user)).await.unwrap();
  }

  let records = store.get_by_request("r1").await.unwrap();
  let order: Vec<_> = records.iter().map(|r| r.recommended_user_id.as_str()).collect();
  assert_eq!(order, vec!["u1", "u2", "u3"]);
}

#[tokio::test]
async fn test_ranked_view_uses_scores() {
  let store = provisioned_store().await;
  store.put(RecommendationRecord::new("r1", "u1").with_score(0.2)).await.unwrap();
  store.put(RecommendationRecord::new("r1", "u2").with_score(0.7)).await.unwrap();
  store.put(RecommendationRecord::new("r1", "u3")).await.unwrap();

  let records = ranked(store.get_by_request("r1").await.unwrap());
  let order: Vec<_> = records.iter().map(|r| r.recommended_user_id.as_str()).collect();
  assert_eq!(order, vec!["u2", "u1", "u3"]);
}

#[tokio::test]
async fn test_replace_request_supersedes_previous_set() {
  let store = provisioned_store().await;
  store.put(RecommendationRecord::new("r1", "u1")).await.unwrap();
  store.put(RecommendationRecord::new("r1", "u2")).await.unwrap();
  store.put(RecommendationRecord::new("r2", "u1")).await.unwrap();

  let fresh = vec![RecommendationRecord::new("r1", "u3"), RecommendationRecord::new("r1", "u4")];
  store.replace_request("r1", fresh).await.unwrap();

  let records = store.get_by_request("r1").await.unwrap();
  assert_eq!(user_ids(&records), BTreeSet::from(["u3".to_string(), "u4".to_string()]));
  assert_eq!(store.get_by_request("r2").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_replace_request_rejects_foreign_records_without_change() {
  let store = provisioned_store().await;
  store.put(RecommendationRecord::new("r1", "u1")).await.unwrap();

  let foreign = vec![RecommendationRecord::new("r2", "u9")];
  let error = store.replace_request("r1", foreign).await.unwrap_err();

  assert!(matches!(error, StoreError::InvalidRecord { .. }));
  assert_eq!(store.get_by_request("r1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_request_counts_removed_records() {
  let store = provisioned_store().await;
  for user in ["u1", "u2", "u3"] {
    store.put(RecommendationRecord::new("r1", user)).await.unwrap();
  }

  assert_eq!(store.delete_request("r1").await.unwrap(), 3);
  assert_eq!(store.delete_request("r1").await.unwrap(), 0);
  assert!(store.get_by_request("r1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_records_are_rejected() {
  let store = provisioned_store().await;

  let error = store.put(RecommendationRecord::new("", "u1")).await.unwrap_err();
  assert!(matches!(error, StoreError::InvalidRecord { .. }));
  assert!(store.get_by_request("").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_keys_address_nothing() {
  let store = provisioned_store().await;
  store.put(RecommendationRecord::new("r1", "u1")).await.unwrap();

  assert!(store.get_by_request(" ").await.unwrap().is_empty());
  store.delete("", "u1").await.unwrap();
  store.delete("r1", "").await.unwrap();
  assert_eq!(store.delete_request("").await.unwrap(), 0);

  let error = store.delete_expected("r1", "").await.unwrap_err();
  assert_eq!(error, StoreError::not_found("r1", ""));

  let error = store.replace_request("", Vec::new()).await.unwrap_err();
  assert!(matches!(error, StoreError::InvalidRecord { .. }));

  assert_eq!(store.get_by_request("r1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_puts_to_same_pair_leave_one_record() {
  let store = Arc::new(provisioned_store().await);

  let handles: Vec<_> = (0..16)
    .map(|i| {
      let store = store.clone();
      tokio::spawn(async move {
        store.put(RecommendationRecord::new("r1", "u1").with_score(i as f64)).await
      })
    })
    .collect();

  for handle in handles {
    handle.await.unwrap().unwrap();
  }

  let records = store.get_by_request("r1").await.unwrap();
  assert_eq!(records.len(), 1);
}
