//! Vocabulary API client.
//!
//! Plain fetch + JSON wrapper: bearer token header, TTL cache on reads,
//! cache cleared by every write. No retries.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use super::cache::TtlCache;
use super::error::ApiError;
use super::types::{
  CardQuery, CardsPage, ReviewResponse, ReviewSession, SessionSummary, StartSessionRequest,
  UserStatistics,
};
use crate::config::{Config, REQUEST_TIMEOUT_SECS};
use crate::domain::{CardState, VocabularyCard};

pub struct VocabularyApiClient {
  base_url: String,
  token: Option<String>,
  client: reqwest::Client,
  cache: TtlCache<serde_json::Value>,
}

impl VocabularyApiClient {
  pub fn new(base_url: &str, token: Option<String>, cache_ttl: Duration) -> Result<Self, ApiError> {
    Ok(Self {
      base_url: base_url.trim_end_matches('/').to_string(),
      token,
      client: build_http_client()?,
      cache: TtlCache::new(cache_ttl),
    })
  }

  pub fn from_config(config: &Config) -> Result<Self, ApiError> {
    Self::new(
      &config.api_base_url,
      config.api_token.clone(),
      Duration::from_secs(config.api_cache_ttl_secs),
    )
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Drop every cached GET response
  pub fn clear_cache(&self) {
    self.cache.clear();
  }

  // ==================== Cards ====================

  pub async fn list_cards(&self, query: &CardQuery) -> Result<CardsPage, ApiError> {
    self.get_cached("/vocabulary/cards", &query.to_query()).await
  }

  pub async fn get_card(&self, card_id: i64) -> Result<VocabularyCard, ApiError> {
    self.get_cached(&format!("/vocabulary/cards/{card_id}"), &[]).await
  }

  // ==================== Card states ====================

  /// A user's card states sorted by next review. Always fetched fresh:
  /// the scheduler keeps its own cache.
  #[instrument(skip(self))]
  pub async fn get_card_states(&self, user_id: &str, limit: usize) -> Result<Vec<CardState>, ApiError> {
    let query = [("limit", limit.to_string()), ("sortBy", "nextReview".to_string())];
    let response = self
      .authorized(self.client.get(self.url(&states_path(user_id))))
      .query(&query)
      .send()
      .await
      .map_err(|e| map_send_error(e, &self.base_url))?;
    read_json(response).await
  }

  // ==================== Sessions ====================

  pub async fn start_session(&self, request: &StartSessionRequest) -> Result<ReviewSession, ApiError> {
    self.post("/vocabulary/sessions/start", request).await
  }

  /// Submit one response; the upstream returns the recomputed card state
  pub async fn submit_response(&self, session_id: &str, response: &ReviewResponse) -> Result<CardState, ApiError> {
    self
      .post(&format!("/vocabulary/sessions/{session_id}/responses"), response)
      .await
  }

  pub async fn end_session(&self, session_id: &str) -> Result<SessionSummary, ApiError> {
    self
      .post(&format!("/vocabulary/sessions/{session_id}/end"), &serde_json::json!({}))
      .await
  }

  // ==================== Statistics ====================

  pub async fn get_statistics(&self, user_id: &str) -> Result<UserStatistics, ApiError> {
    self
      .get_cached(&format!("/vocabulary/users/{user_id}/statistics"), &[])
      .await
  }

  // ==================== Plumbing ====================

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match &self.token {
      Some(token) => builder.bearer_auth(token),
      None => builder,
    }
  }

  #[instrument(skip(self, query))]
  async fn get_cached<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
    let key = cache_key(path, query);
    if let Some(value) = self.cache.get(&key) {
      tracing::debug!("cache hit for {}", key);
      return serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()));
    }

    let response = self
      .authorized(self.client.get(self.url(path)))
      .query(query)
      .send()
      .await
      .map_err(|e| map_send_error(e, &self.base_url))?;
    let value: serde_json::Value = read_json(response).await?;
    self.cache.insert(key, value.clone());

    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
  }

  #[instrument(skip(self, body))]
  async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
    // Writes make every cached read suspect
    self.cache.clear();

    let response = self
      .authorized(self.client.post(self.url(path)))
      .json(body)
      .send()
      .await
      .map_err(|e| map_send_error(e, &self.base_url))?;
    read_json(response).await
  }
}

fn states_path(user_id: &str) -> String {
  format!("/vocabulary/users/{user_id}/cards/states")
}

fn cache_key(path: &str, query: &[(&str, String)]) -> String {
  let mut pairs: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
  pairs.sort();
  format!("{}?{}", path, pairs.join("&"))
}

pub(crate) fn build_http_client() -> Result<reqwest::Client, ApiError> {
  reqwest::Client::builder()
    .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
    .build()
    .map_err(|e| ApiError::Network(e.to_string()))
}

pub(crate) fn map_send_error(e: reqwest::Error, base_url: &str) -> ApiError {
  if e.is_timeout() {
    ApiError::Timeout(REQUEST_TIMEOUT_SECS)
  } else if e.is_connect() {
    ApiError::Network(format!("API not reachable at {}: {}", base_url, e))
  } else {
    ApiError::Network(e.to_string())
  }
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
  let status = response.status().as_u16();
  if status >= 400 {
    let message = response.text().await.unwrap_or_default();
    return Err(ApiError::Status { status, message });
  }

  response
    .json()
    .await
    .map_err(|e| ApiError::Decode(e.to_string()))
}
