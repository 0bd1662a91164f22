//! agify.io age prediction client

use async_trait::async_trait;
use persona_common::RequestContext;
use serde::Deserialize;

use super::http::fetch_json;
use super::{AgeLookup, LookupError};

const SERVICE: &str = "agify";

#[derive(Debug, Deserialize)]
struct AgifyResponse {
    /// `null` when the service has no data for the name
    age: Option<i64>,
}

/// Age prediction via agify.io
pub struct AgifyClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl AgifyClient {
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AgeLookup for AgifyClient {
    async fn get(&self, ctx: &RequestContext, name: &str) -> Result<i64, LookupError> {
        let response: AgifyResponse =
            fetch_json(&self.http_client, &self.base_url, SERVICE, ctx, name).await?;
        Ok(response.age.unwrap_or(0))
    }
}
