//! Payroll API Server
//!
//! Main entry point for the payroll backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payroll_api::{AppState, create_router};
use payroll_core::import::{ImportJobs, MokaProgressStore, ProgressStore};
use payroll_core::storage::{StagingBackend, StagingStore};
use payroll_db::{SalaryImportRepository, connect_with};
use payroll_shared::jwt::{JwtConfig, JwtService};
use payroll_shared::{AppConfig, BusinessClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payroll=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let clock = BusinessClock::from_name(&config.business.time_zone)?;
    let jwt_service = JwtService::new(JwtConfig::from(&config.jwt));

    let max_upload = u64::try_from(config.import.max_upload_bytes)?;
    let staging = StagingStore::from_backend(
        &StagingBackend::local_fs(&config.import.staging_root),
        max_upload,
    )?;
    let progress: Arc<dyn ProgressStore> = Arc::new(MokaProgressStore::with_config(
        config.import.progress_capacity,
        config.import.progress_ttl_secs,
    ));
    info!(
        staging = %staging.backend_name(),
        root = %config.import.staging_root.display(),
        time_zone = %config.business.time_zone,
        "Import worker configured"
    );

    let state = AppState::new(
        db,
        jwt_service,
        staging,
        progress,
        clock,
        config.import.max_upload_bytes,
    );
    let imports = state.imports.clone();

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(imports))
        .await?;

    Ok(())
}

/// Resolves on Ctrl+C and cancels the imports still running.
async fn shutdown_signal(imports: ImportJobs<SalaryImportRepository>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    let running = imports.running_count();
    if running > 0 {
        info!(running, "cancelling running salary imports");
    }
    imports.cancel_all();
}
