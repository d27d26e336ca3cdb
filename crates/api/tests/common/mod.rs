//! Shared fixtures for router tests: the full router over an in-memory
//! SQLite database with the real migrations applied.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{NaiveDate, Utc};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Database, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use payroll_api::{AppState, create_router};
use payroll_core::import::{MokaProgressStore, ProgressStore};
use payroll_core::storage::StagingStore;
use payroll_db::Migrator;
use payroll_db::entities::{sea_orm_active_enums::UserRole, users};
use payroll_shared::BusinessClock;
use payroll_shared::jwt::{JwtConfig, JwtService};

/// The date every test runs on.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 15).unwrap()
}

/// A router and the state behind it.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    /// Builds the app over a fresh database.
    pub async fn new() -> Self {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to sqlite");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let jwt = JwtService::new(JwtConfig {
            secret: "router-test-secret-with-enough-length".to_string(),
            access_token_expires_secs: 3600,
        });
        let progress: Arc<dyn ProgressStore> = Arc::new(MokaProgressStore::new());
        let state = AppState::new(
            db,
            jwt,
            StagingStore::memory().unwrap(),
            progress,
            BusinessClock::pinned(today()),
            1024 * 1024,
        );
        let router = create_router(state.clone());
        Self { state, router }
    }

    /// Inserts an account without password hashing and returns a token for it.
    pub async fn account(
        &self,
        username: &str,
        role: UserRole,
        base_salary: Option<Decimal>,
        must_change_password: bool,
    ) -> (Uuid, String) {
        let now = Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::now_v7()),
            username: Set(username.to_string()),
            employee_id: Set(Some(username.to_string())),
            first_name: Set(format!("{username}-first")),
            last_name: Set("Tester".to_string()),
            role: Set(role),
            branch_name: Set(String::new()),
            bank_account_number: Set(String::new()),
            base_salary: Set(base_salary),
            password_hash: Set("not-a-hash".to_string()),
            must_change_password: Set(must_change_password),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let id = user
            .insert(self.state.db.as_ref())
            .await
            .expect("Failed to insert user")
            .id;

        let role = match role {
            UserRole::Admin => "admin",
            UserRole::Hr => "hr",
            UserRole::User => "user",
        };
        let token = self
            .state
            .jwt_service
            .generate_access_token(id, role)
            .expect("should generate token");
        (id, token)
    }

    /// Sends a request and returns the status with the JSON body.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    /// GET with a bearer token.
    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Request with a JSON body and a bearer token.
    pub async fn json(&self, method: &str, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Request without a body.
    pub async fn call(&self, method: &str, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

/// Parses a decimal rendered as a JSON string.
pub fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("decimal should be a string")
        .parse()
        .expect("decimal should parse")
}
