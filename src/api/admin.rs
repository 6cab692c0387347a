//! Admin CMS API client.
//!
//! Authenticates with the static `x-admin-key` header only.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use super::client::{build_http_client, map_send_error, read_json};
use super::error::ApiError;
use super::types::{AdminStats, ContentSummary};
use crate::config::Config;
use crate::domain::{CefrLevel, VocabularyCard};

const ADMIN_KEY_HEADER: &str = "x-admin-key";

pub struct AdminApiClient {
  base_url: String,
  admin_key: Option<String>,
  client: reqwest::Client,
}

impl AdminApiClient {
  pub fn new(base_url: &str, admin_key: Option<String>) -> Result<Self, ApiError> {
    Ok(Self {
      base_url: base_url.trim_end_matches('/').to_string(),
      admin_key,
      client: build_http_client()?,
    })
  }

  pub fn from_config(config: &Config) -> Result<Self, ApiError> {
    Self::new(&config.admin_base_url, config.admin_key.clone())
  }

  pub async fn stats(&self) -> Result<AdminStats, ApiError> {
    self.get("/admin/stats").await
  }

  pub async fn contents(&self) -> Result<Vec<ContentSummary>, ApiError> {
    self.get("/admin/contents").await
  }

  pub async fn vocabulary_by_level(&self, level: CefrLevel) -> Result<Vec<VocabularyCard>, ApiError> {
    self
      .get(&format!("/admin/vocabulary/{}", level.as_str()))
      .await
  }

  fn with_key(&self, builder: RequestBuilder) -> RequestBuilder {
    match &self.admin_key {
      Some(key) => builder.header(ADMIN_KEY_HEADER, key),
      None => builder,
    }
  }

  async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
    let response = self
      .with_key(self.client.get(format!("{}{}", self.base_url, path)))
      .send()
      .await
      .map_err(|e| map_send_error(e, &self.base_url))?;
    read_json(response).await
  }
}
