//! HTTP client for the recommendations REST API
//!
//! Thin reqwest wrapper used by the CLI (and by the dashboard tooling) to talk
//! to a running recommendations server.

use anyhow::{anyhow, Result};
use reqwest::{Client, Response, Url};
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;

use crate::server::types::{
  ApiError, BaseResponse, ClearResponse, LogsResponse, PutRecommendationRequest,
  RecommendationCandidate, RecommendationResponse, RecommendationsResponse,
  ReplaceRecommendationsRequest, SchemaResponse, StatusResponse, VersionResponse,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Configuration for the recommendations HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
  /// Base URL of the server (e.g., "http://localhost:3000")
  pub base_url: String,
  /// Request timeout in seconds
  pub timeout_secs: u64,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self { base_url: DEFAULT_BASE_URL.to_string(), timeout_secs: 30 }
  }
}

impl ClientConfig {
  /// Defaults overridden by `RECOMMENDATIONS_URL` and `RECOMMENDATIONS_CLIENT_TIMEOUT_SECS`
  pub fn from_env() -> Self {
    let mut config = Self::default();
    if let Ok(url) = std::env::var("RECOMMENDATIONS_URL") {
      if !url.trim().is_empty() {
        config.base_url = url.trim().trim_end_matches('/').to_string();
      }
    }
    let timeout = std::env::var("RECOMMENDATIONS_CLIENT_TIMEOUT_SECS").ok();
    if let Some(secs) = timeout.and_then(|s| s.parse().ok()) {
      config.timeout_secs = secs;
    }
    config
  }
}

/// HTTP client for the recommendations REST API
pub struct RecommendationsClient {
  client: Client,
  base_url: Url,
}

impl RecommendationsClient {
  pub fn with_config(config: ClientConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|e| anyhow!("Failed to create HTTP client: {e}"))?;

    let base_url = Url::parse(&config.base_url)
      .map_err(|e| anyhow!("Invalid server URL '{}': {e}", config.base_url))?;
    if base_url.cannot_be_a_base() {
      return Err(anyhow!("Invalid server URL '{}': not a base URL", config.base_url));
    }

    Ok(Self { client, base_url })
  }

  /// Build an endpoint URL, escaping each path segment
  fn url(&self, segments: &[&str]) -> Result<Url> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| anyhow!("Invalid server URL '{}'", self.base_url))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  pub async fn status(&self) -> Result<StatusResponse> {
    let response = self.client.get(self.url(&["status"])?).send().await?;
    decode(response, "Failed to get server status").await
  }

  pub async fn version(&self) -> Result<VersionResponse> {
    let response = self.client.get(self.url(&["version"])?).send().await?;
    decode(response, "Failed to get server version").await
  }

  pub async fn put(
    &self,
    request_id: &str,
    recommended_user_id: &str,
    score: Option<f64>,
    ttl_secs: Option<i64>,
  ) -> Result<RecommendationResponse> {
    let request = PutRecommendationRequest {
      request_id: request_id.to_string(),
      recommended_user_id: recommended_user_id.to_string(),
      score,
      ttl_secs,
    };

    let response = self.client.post(self.url(&["recommendations"])?).json(&request).send().await?;
    decode(response, "Failed to store recommendation").await
  }

  pub async fn get(&self, request_id: &str, ranked: bool) -> Result<RecommendationsResponse> {
    let mut url = self.url(&["recommendations", request_id])?;
    if ranked {
      url.query_pairs_mut().append_pair("ranked", "true");
    }

    let response = self.client.get(url).send().await?;
    decode(response, "Failed to get recommendations").await
  }

  pub async fn replace(
    &self,
    request_id: &str,
    recommendations: Vec<RecommendationCandidate>,
  ) -> Result<RecommendationsResponse> {
    let request = ReplaceRecommendationsRequest { recommendations };
    let response =
      self.client.put(self.url(&["recommendations", request_id])?).json(&request).send().await?;
    decode(response, "Failed to replace recommendations").await
  }

  pub async fn delete(
    &self,
    request_id: &str,
    recommended_user_id: &str,
    expect: bool,
  ) -> Result<()> {
    let mut url = self.url(&["recommendations", request_id, recommended_user_id])?;
    if expect {
      url.query_pairs_mut().append_pair("expect", "true");
    }

    let response = self.client.delete(url).send().await?;
    decode::<serde_json::Value>(response, "Failed to delete recommendation").await?;
    Ok(())
  }

  pub async fn clear(&self, request_id: &str) -> Result<ClearResponse> {
    let response = self.client.delete(self.url(&["recommendations", request_id])?).send().await?;
    decode(response, "Failed to clear recommendations").await
  }

  pub async fn create_schema(&self) -> Result<SchemaResponse> {
    let response = self.client.post(self.url(&["schema"])?).send().await?;
    decode(response, "Failed to provision table").await
  }

  pub async fn schema(&self) -> Result<SchemaResponse> {
    let response = self.client.get(self.url(&["schema"])?).send().await?;
    decode(response, "Failed to describe table").await
  }

  pub async fn logs(&self, limit: Option<usize>, level: Option<&str>) -> Result<LogsResponse> {
    let mut url = self.url(&["logs"])?;
    {
      let mut query = url.query_pairs_mut();
      if let Some(limit) = limit {
        query.append_pair("limit", &limit.to_string());
      }
      if let Some(level) = level {
        query.append_pair("level", level);
      }
    }

    let response = self.client.get(url).send().await?;
    decode(response, "Failed to get logs").await
  }
}

#[derive(Deserialize)]
struct ErrorBody {
  #[serde(default)]
  errors: Vec<ApiError>,
}

/// Unwrap the response envelope, surfacing the server's error entries on failure
async fn decode<T: DeserializeOwned>(response: Response, action: &str) -> Result<T> {
  let status = response.status();

  if !status.is_success() {
    let text = response.text().await?;
    let detail = match serde_json::from_str::<ErrorBody>(&text) {
      Ok(body) if !body.errors.is_empty() => body
        .errors
        .iter()
        .map(|e| format!("{} ({})", e.message, e.key))
        .collect::<Vec<_>>()
        .join("; "),
      _ => text,
    };
    return Err(anyhow!("{action}: {detail} [HTTP {status}]"));
  }

  let body: BaseResponse<T> = response.json().await?;
  Ok(body.data)
}

/// Client configured from the environment
pub fn get_client() -> Result<RecommendationsClient> {
  RecommendationsClient::with_config(ClientConfig::from_env())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(base: &str) -> RecommendationsClient {
    RecommendationsClient::with_config(ClientConfig { base_url: base.to_string(), timeout_secs: 5 })
      .unwrap()
  }

  #[test]
  fn test_url_escapes_segments() {
    let url = client("http://localhost:3000").url(&["recommendations", "req/1", "user 2"]).unwrap();
    assert_eq!(url.as_str(), "http://localhost:3000/recommendations/req%2F1/user%202");
  }

  #[test]
  fn test_url_keeps_base_path() {
    let url = client("http://gateway.local/api/").url(&["status"]).unwrap();
    assert_eq!(url.as_str(), "http://gateway.local/api/status");
  }

  #[test]
  fn test_rejects_non_base_url() {
    let result = RecommendationsClient::with_config(ClientConfig {
      base_url: "mailto:ops@example.com".to_string(),
      timeout_secs: 5,
    });
    assert!(result.is_err());
  }
}
