//! persona-svc library - person enrichment service
//!
//! Predicts age, gender and nationality for a name through three external
//! lookup services queried in parallel, stores the enriched record, and
//! exposes CRUD over stored records.

use axum::Router;
use persona_common::RequestContext;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod enrich;
pub mod error;
pub mod lookup;
pub mod service;

use service::PersonService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: PersonService,
    /// Cancelled on process shutdown; parent of every request context
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create new application state
    pub fn new(service: PersonService, shutdown: CancellationToken) -> Self {
        Self { service, shutdown }
    }

    /// Fresh context for one request, cancelled when the process shuts down
    pub fn request_context(&self) -> RequestContext {
        RequestContext::from_token(self.shutdown.child_token())
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{post, put};

    Router::new()
        .route("/", put(api::add_person).get(api::get_persons))
        .route("/:id", post(api::update_person).delete(api::delete_person))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
