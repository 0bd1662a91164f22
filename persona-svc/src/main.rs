//! persona-svc - person enrichment service
//!
//! Enriches names with predicted age, gender and nationality, stores the
//! result in SQLite, and serves CRUD over stored records.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use persona_common::config::{load_toml_config, ConfigOverrides, ServiceConfig};
use persona_svc::db::{init_database_pool, SqlitePersonStore};
use persona_svc::enrich::Enricher;
use persona_svc::lookup::{build_http_client, Lookups};
use persona_svc::service::PersonService;
use persona_svc::{build_router, AppState};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Command-line arguments for persona-svc
#[derive(Parser, Debug)]
#[command(name = "persona-svc")]
#[command(about = "Person enrichment service")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "PERSONA_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, env = "PERSONA_LISTEN")]
    listen: Option<String>,

    /// SQLite database URL
    #[arg(long, env = "PERSONA_DATABASE_URL")]
    database_url: Option<String>,

    /// Age prediction service base URL
    #[arg(long, env = "PERSONA_AGIFY_URL")]
    agify_url: Option<String>,

    /// Gender prediction service base URL
    #[arg(long, env = "PERSONA_GENDERIZE_URL")]
    genderize_url: Option<String>,

    /// Nationality prediction service base URL
    #[arg(long, env = "PERSONA_NATIONALIZE_URL")]
    nationalize_url: Option<String>,

    /// Timeout applied to each lookup individually (milliseconds)
    #[arg(long, env = "PERSONA_BRANCH_TIMEOUT_MS")]
    branch_timeout_ms: Option<u64>,

    /// Database connection acquire timeout (milliseconds)
    #[arg(long, env = "PERSONA_DB_TIMEOUT_MS")]
    db_timeout_ms: Option<u64>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            listen: self.listen.clone(),
            database_url: self.database_url.clone(),
            agify_url: self.agify_url.clone(),
            genderize_url: self.genderize_url.clone(),
            nationalize_url: self.nationalize_url.clone(),
            branch_timeout_ms: self.branch_timeout_ms,
            db_timeout_ms: self.db_timeout_ms,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal outside local development
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let loaded = load_toml_config(args.config.as_deref())?;
    let config_source = loaded.source.clone();
    let config = ServiceConfig::resolve(args.overrides(), loaded.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .init();

    info!(
        "Starting persona-svc v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("PERSONA_GIT_REV"),
        env!("PERSONA_BUILD_TIME"),
        env!("PERSONA_BUILD_PROFILE")
    );
    info!("{}", config_source_message(config_source.as_deref()));
    info!(
        branch_timeout_ms = config.branch_timeout.as_millis() as u64,
        "Lookups: {}, {}, {}",
        config.agify_url,
        config.genderize_url,
        config.nationalize_url
    );

    let pool = init_database_pool(&config.database_url, config.db_timeout).await?;
    info!("✓ Connected to database {}", config.database_url);

    let http_client = build_http_client().context("Failed to create HTTP client")?;
    let lookups = Lookups::http(
        http_client,
        &config.agify_url,
        &config.genderize_url,
        &config.nationalize_url,
    );
    let enricher = Enricher::new(lookups, config.branch_timeout);
    let service = PersonService::new(enricher, Arc::new(SqlitePersonStore::new(pool)));

    let shutdown = CancellationToken::new();
    let state = AppState::new(service, shutdown.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen))?;
    info!("persona-svc listening on http://{}", config.listen);
    info!("Health check: http://{}/health", config.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

fn config_source_message(source: Option<&Path>) -> String {
    match source {
        Some(path) => format!("Loaded config from {}", path.display()),
        None => "No config file found, using defaults".to_string(),
    }
}

/// Wait for Ctrl+C or SIGTERM, then cancel every in-flight request context
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }

    shutdown.cancel();
}
