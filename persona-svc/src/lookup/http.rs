//! Shared HTTP plumbing for the lookup clients

use persona_common::RequestContext;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::LookupError;

const USER_AGENT: &str = concat!("persona/", env!("CARGO_PKG_VERSION"));

/// Upper bound for any single lookup, independent of request contexts
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client shared by all lookup clients
pub fn build_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(DEFAULT_TIMEOUT)
        .build()
}

/// `GET {base_url}?name={name}` and decode the JSON body
///
/// The request inherits whatever time remains on `ctx`.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    base_url: &str,
    service: &'static str,
    ctx: &RequestContext,
    name: &str,
) -> Result<T, LookupError> {
    let mut request = client.get(base_url).query(&[("name", name)]);
    if let Some(remaining) = ctx.remaining() {
        request = request.timeout(remaining);
    }

    let response = request
        .send()
        .await
        .map_err(|source| LookupError::Http { service, source })?;

    let status = response.status();
    if !status.is_success() {
        return Err(LookupError::Status {
            service,
            status: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|source| LookupError::Http { service, source })?;

    let decoded = serde_json::from_slice(&body)
        .map_err(|source| LookupError::Decode { service, source })?;

    debug!(service, name, "Lookup request succeeded");
    Ok(decoded)
}
