//! genderize.io gender prediction client

use async_trait::async_trait;
use persona_common::RequestContext;
use serde::Deserialize;

use super::http::fetch_json;
use super::{GenderLookup, LookupError};

const SERVICE: &str = "genderize";

#[derive(Debug, Deserialize)]
struct GenderizeResponse {
    gender: Option<String>,
}

/// Gender prediction via genderize.io
pub struct GenderizeClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GenderizeClient {
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl GenderLookup for GenderizeClient {
    async fn get(&self, ctx: &RequestContext, name: &str) -> Result<String, LookupError> {
        let response: GenderizeResponse =
            fetch_json(&self.http_client, &self.base_url, SERVICE, ctx, name).await?;
        Ok(response.gender.unwrap_or_default())
    }
}
