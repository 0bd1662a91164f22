//! Prediction lookup clients
//!
//! Three independent services predict a person's age, gender and
//! nationality from a first name. Each is exposed behind its own trait so
//! the enrichment workflow can be driven by any implementation (HTTP
//! clients in production, in-process fakes in tests).
//!
//! # Clients
//! 1. **agify** - age prediction
//! 2. **genderize** - gender prediction
//! 3. **nationalize** - nationality prediction (ISO country code)

pub mod agify;
pub mod genderize;
pub mod http;
pub mod nationalize;

use async_trait::async_trait;
use persona_common::RequestContext;
use std::sync::Arc;
use thiserror::Error;

pub use agify::AgifyClient;
pub use genderize::GenderizeClient;
pub use http::build_http_client;
pub use nationalize::{NationalizeClient, UNKNOWN_COUNTRY};

/// Lookup client errors
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("{service} request failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("failed to decode {service} response: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Age prediction
#[async_trait]
pub trait AgeLookup: Send + Sync {
    async fn get(&self, ctx: &RequestContext, name: &str) -> Result<i64, LookupError>;
}

/// Gender prediction ("male", "female", or empty when unknown)
#[async_trait]
pub trait GenderLookup: Send + Sync {
    async fn get(&self, ctx: &RequestContext, name: &str) -> Result<String, LookupError>;
}

/// Nationality prediction (country code, or [`UNKNOWN_COUNTRY`])
#[async_trait]
pub trait NationalityLookup: Send + Sync {
    async fn get(&self, ctx: &RequestContext, name: &str) -> Result<String, LookupError>;
}

/// The three lookup clients used by one enrichment
#[derive(Clone)]
pub struct Lookups {
    pub age: Arc<dyn AgeLookup>,
    pub gender: Arc<dyn GenderLookup>,
    pub nationality: Arc<dyn NationalityLookup>,
}

impl Lookups {
    pub fn new(
        age: Arc<dyn AgeLookup>,
        gender: Arc<dyn GenderLookup>,
        nationality: Arc<dyn NationalityLookup>,
    ) -> Self {
        Self {
            age,
            gender,
            nationality,
        }
    }

    /// HTTP clients against the configured base URLs, sharing one connection pool
    pub fn http(
        client: reqwest::Client,
        agify_url: &str,
        genderize_url: &str,
        nationalize_url: &str,
    ) -> Self {
        Self::new(
            Arc::new(AgifyClient::new(client.clone(), agify_url)),
            Arc::new(GenderizeClient::new(client.clone(), genderize_url)),
            Arc::new(NationalizeClient::new(client, nationalize_url)),
        )
    }
}
