//! Shared fixtures for repository tests: an in-memory SQLite database with
//! the real migrations applied.

#![allow(dead_code)]

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use payroll_db::Migrator;
use payroll_db::entities::{sea_orm_active_enums::UserRole, users};

/// Connects to a fresh in-memory database and runs every migration.
pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to sqlite");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Inserts an employee without going through password hashing.
pub async fn insert_user(
    db: &DatabaseConnection,
    username: &str,
    role: UserRole,
    base_salary: Option<Decimal>,
) -> Uuid {
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
        must_change_password: Set(false),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };
    user.insert(db).await.expect("Failed to insert user").id
}
