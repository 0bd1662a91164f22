//! Person service: enrichment plus CRUD over stored records
//!
//! Sits between the HTTP handlers and the collaborators. Adding a person is
//! all-or-nothing: the store is only called once enrichment fully succeeded.

use persona_common::{AggregatedError, NewPerson, PersonFilter, PersonInfo, RequestContext};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::db::PersonStore;
use crate::enrich::Enricher;

/// Service layer errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// At least one lookup failed; nothing was stored
    #[error("Enrichment failed: {0}")]
    Enrichment(#[from] AggregatedError),

    #[error(transparent)]
    Storage(#[from] persona_common::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Clone)]
pub struct PersonService {
    enricher: Enricher,
    store: Arc<dyn PersonStore>,
}

impl PersonService {
    pub fn new(enricher: Enricher, store: Arc<dyn PersonStore>) -> Self {
        Self { enricher, store }
    }

    /// Enrich `name` and store the resulting record
    pub async fn add(
        &self,
        ctx: &RequestContext,
        name: &str,
        surname: &str,
    ) -> ServiceResult<PersonInfo> {
        if name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("name must not be empty".to_string()));
        }

        let person: NewPerson = self.enricher.enrich(ctx, name, surname).await?;

        self.store.add(ctx, person).await.map_err(|e| {
            error!(error = %e, "Error adding person to database");
            ServiceError::from(e)
        })
    }

    pub async fn find(
        &self,
        ctx: &RequestContext,
        filter: &PersonFilter,
    ) -> ServiceResult<Vec<PersonInfo>> {
        self.store.find(ctx, filter).await.map_err(|e| {
            error!(error = %e, "Error getting persons from database");
            ServiceError::from(e)
        })
    }

    pub async fn update(&self, ctx: &RequestContext, info: &PersonInfo) -> ServiceResult<()> {
        self.store.update(ctx, info).await.map_err(|e| {
            error!(id = info.id, error = %e, "Error updating person in database");
            ServiceError::from(e)
        })
    }

    pub async fn delete(&self, ctx: &RequestContext, id: i64) -> ServiceResult<()> {
        self.store.delete(ctx, id).await.map_err(|e| {
            error!(id, error = %e, "Error deleting person from database");
            ServiceError::from(e)
        })
    }

    /// Storage reachability for `GET /health`
    pub async fn ping(&self, ctx: &RequestContext) -> ServiceResult<()> {
        Ok(self.store.ping(ctx).await?)
    }
}
