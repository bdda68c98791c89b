//! Conversion between records and DynamoDB items

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::error::StoreError;
use crate::record::RecommendationRecord;
use crate::schema::{
  ATTR_CREATED_AT, ATTR_EXPIRES_AT, ATTR_RECOMMENDED_USER_ID, ATTR_REQUEST_ID, ATTR_SCORE,
};

pub(crate) type Item = HashMap<String, AttributeValue>;

/// Primary key of one record
pub(crate) fn key_item(request_id: &str, recommended_user_id: &str) -> Item {
  HashMap::from([
    (ATTR_REQUEST_ID.to_string(), AttributeValue::S(request_id.to_string())),
    (ATTR_RECOMMENDED_USER_ID.to_string(), AttributeValue::S(recommended_user_id.to_string())),
  ])
}

pub(crate) fn record_to_item(record: &RecommendationRecord) -> Item {
  let mut item = key_item(&record.request_id, &record.recommended_user_id);
  item.insert(ATTR_CREATED_AT.to_string(), AttributeValue::S(record.created_at.to_rfc3339()));

  if let Some(score) = record.score {
    item.insert(ATTR_SCORE.to_string(), AttributeValue::N(score.to_string()));
  }
  if let Some(expires_at) = record.expires_at {
    item.insert(ATTR_EXPIRES_AT.to_string(), AttributeValue::N(expires_at.timestamp().to_string()));
  }

  item
}

/// Decode an item. Items written by other tools may carry only the key pair,
/// so every non-key attribute is optional; `created_at` then reads as the epoch.
pub(crate) fn item_to_record(item: &Item) -> Result<RecommendationRecord, StoreError> {
  let request_id = string_attr(item, ATTR_REQUEST_ID)?
    .ok_or_else(|| malformed(format!("item is missing {ATTR_REQUEST_ID}")))?;
  let recommended_user_id = string_attr(item, ATTR_RECOMMENDED_USER_ID)?
    .ok_or_else(|| malformed(format!("item is missing {ATTR_RECOMMENDED_USER_ID}")))?;

  let score = number_attr(item, ATTR_SCORE)?
    .map(|n| n.parse::<f64>().map_err(|e| malformed(format!("bad {ATTR_SCORE} '{n}': {e}"))))
    .transpose()?;

  let expires_at = number_attr(item, ATTR_EXPIRES_AT)?
    .map(|n| {
      n.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| malformed(format!("bad {ATTR_EXPIRES_AT} '{n}'")))
    })
    .transpose()?;

  let created_at = match string_attr(item, ATTR_CREATED_AT)? {
    Some(raw) => DateTime::parse_from_rfc3339(raw)
      .map(|t| t.with_timezone(&Utc))
      .map_err(|e| malformed(format!("bad {ATTR_CREATED_AT} '{raw}': {e}")))?,
    None => DateTime::<Utc>::UNIX_EPOCH,
  };

  Ok(RecommendationRecord {
    request_id: request_id.to_string(),
    recommended_user_id: recommended_user_id.to_string(),
    score,
    expires_at,
    created_at,
  })
}

fn string_attr<'a>(item: &'a Item, name: &str) -> Result<Option<&'a str>, StoreError> {
  match item.get(name) {
    None => Ok(None),
    Some(AttributeValue::S(value)) => Ok(Some(value.as_str())),
    Some(other) => Err(malformed(format!("{name} should be a string, got {other:?}"))),
  }
}

fn number_attr<'a>(item: &'a Item, name: &str) -> Result<Option<&'a str>, StoreError> {
  match item.get(name) {
    None | Some(AttributeValue::Null(_)) => Ok(None),
    Some(AttributeValue::N(value)) => Ok(Some(value.as_str())),
    Some(other) => Err(malformed(format!("{name} should be a number, got {other:?}"))),
  }
}

fn malformed(reason: String) -> StoreError {
  StoreError::backend(format!("malformed item: {reason}"))
}
