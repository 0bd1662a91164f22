//! nationalize.io nationality prediction client

use async_trait::async_trait;
use persona_common::RequestContext;
use serde::Deserialize;

use super::http::fetch_json;
use super::{LookupError, NationalityLookup};

const SERVICE: &str = "nationalize";

/// Returned as a successful value when the service has no candidates
pub const UNKNOWN_COUNTRY: &str = "unknown";

#[derive(Debug, Deserialize)]
struct NationalizeResponse {
    #[serde(default)]
    country: Vec<CountryCandidate>,
}

#[derive(Debug, Deserialize)]
struct CountryCandidate {
    country_id: String,
    probability: f32,
}

/// Nationality prediction via nationalize.io
pub struct NationalizeClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl NationalizeClient {
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl NationalityLookup for NationalizeClient {
    async fn get(&self, ctx: &RequestContext, name: &str) -> Result<String, LookupError> {
        let response: NationalizeResponse =
            fetch_json(&self.http_client, &self.base_url, SERVICE, ctx, name).await?;
        Ok(pick_country(response.country))
    }
}

/// Choose one country code from the candidate list
///
/// Candidates are ranked by ascending probability and the first one wins,
/// i.e. the least likely country is stored.
// TODO: switch to the most probable candidate once stored records are re-enriched
fn pick_country(candidates: Vec<CountryCandidate>) -> String {
    candidates
        .into_iter()
        .min_by(|a, b| a.probability.total_cmp(&b.probability))
        .map(|c| c.country_id)
        .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string())
}
