//! GET /health: liveness plus a storage round-trip

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok", or "degraded" when storage is unreachable
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub revision: &'static str,
    pub storage: StorageHealth,
}

#[derive(Debug, Serialize)]
pub struct StorageHealth {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let ctx = state.request_context();
    let storage = match state.service.ping(&ctx).await {
        Ok(()) => StorageHealth {
            reachable: true,
            error: None,
        },
        Err(e) => {
            warn!(error = %e, "Storage health check failed");
            StorageHealth {
                reachable: false,
                error: Some(e.to_string()),
            }
        }
    };

    let (code, status) = if storage.reachable {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status,
            module: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            revision: env!("PERSONA_GIT_REV"),
            storage,
        }),
    )
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
