//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - Authentication and password-change middleware
//! - Mapping from domain errors to JSON responses

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use payroll_core::import::{ImportJobs, ImportRunner, ProgressStore};
use payroll_core::storage::StagingStore;
use payroll_db::SalaryImportRepository;
use payroll_shared::BusinessClock;
use payroll_shared::jwt::JwtService;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Running salary imports.
    pub imports: ImportJobs<SalaryImportRepository>,
    /// Business calendar.
    pub clock: BusinessClock,
    /// Largest accepted upload body.
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wires the state, including the import worker, from its parts.
    pub fn new(
        db: DatabaseConnection,
        jwt_service: JwtService,
        staging: StagingStore,
        progress: Arc<dyn ProgressStore>,
        clock: BusinessClock,
        max_upload_bytes: usize,
    ) -> Self {
        let runner = ImportRunner::new(
            Arc::new(SalaryImportRepository::new(db.clone())),
            Arc::new(staging),
            progress,
            clock,
        );
        Self {
            db: Arc::new(db),
            jwt_service: Arc::new(jwt_service),
            imports: ImportJobs::new(Arc::new(runner)),
            clock,
            max_upload_bytes,
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
