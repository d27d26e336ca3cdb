//! Integration tests for the account repository.

mod common;

use payroll_core::account::{AccountError, DEFAULT_PASSWORD, Role, verify_password};
use payroll_db::entities::sea_orm_active_enums::UserRole;
use payroll_db::repositories::{AccountRepository, CreateAccountInput};
use uuid::Uuid;

fn admin_input() -> CreateAccountInput {
    CreateAccountInput {
        username: "admin".to_string(),
        employee_id: None,
        first_name: "System".to_string(),
        last_name: "Admin".to_string(),
        role: Role::Admin,
        password: "s3cret-pass".to_string(),
        must_change_password: false,
    }
}

#[tokio::test]
async fn test_create_and_find_by_username() {
    let db = common::setup().await;
    let repo = AccountRepository::new(db);

    let created = repo.create(admin_input()).await.unwrap();
    assert_eq!(created.role, Role::Admin);

    let found = repo.find_by_username("admin").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert!(repo.find_by_username("nobody").await.unwrap().is_none());

    let hash = repo.password_hash(created.id).await.unwrap().unwrap();
    assert!(verify_password("s3cret-pass", &hash).unwrap());
}

#[tokio::test]
async fn test_change_password_clears_flag() {
    let db = common::setup().await;
    let repo = AccountRepository::new(db);
    let mut input = admin_input();
    input.role = Role::User;
    input.password = DEFAULT_PASSWORD.to_string();
    input.must_change_password = true;
    let account = repo.create(input).await.unwrap();

    repo.change_password(account.id, "n3w-pass", "n3w-pass")
        .await
        .unwrap();

    let reloaded = repo.find_by_id(account.id).await.unwrap().unwrap();
    assert!(!reloaded.must_change_password);
    let hash = repo.password_hash(account.id).await.unwrap().unwrap();
    assert!(verify_password("n3w-pass", &hash).unwrap());
}

#[tokio::test]
async fn test_change_password_rules_checked_before_lookup() {
    let db = common::setup().await;
    let repo = AccountRepository::new(db);

    let result = repo.change_password(Uuid::new_v4(), "abcd", "abce").await;
    assert!(matches!(result, Err(AccountError::PasswordMismatch)));

    let result = repo
        .change_password(Uuid::new_v4(), DEFAULT_PASSWORD, DEFAULT_PASSWORD)
        .await;
    assert!(matches!(result, Err(AccountError::DefaultPasswordReused)));

    let missing = Uuid::new_v4();
    let result = repo.change_password(missing, "valid-pass", "valid-pass").await;
    assert!(matches!(result, Err(AccountError::NotFound(id)) if id == missing));
}

#[tokio::test]
async fn test_reset_password_only_for_employees() {
    let db = common::setup().await;
    let employee = common::insert_user(&db, "2001", UserRole::User, None).await;
    let hr = common::insert_user(&db, "hr-1", UserRole::Hr, None).await;
    let repo = AccountRepository::new(db);
    let actor = Uuid::new_v4();

    repo.reset_password(actor, employee).await.unwrap();
    let reloaded = repo.find_by_id(employee).await.unwrap().unwrap();
    assert!(reloaded.must_change_password);
    let hash = repo.password_hash(employee).await.unwrap().unwrap();
    assert!(verify_password(DEFAULT_PASSWORD, &hash).unwrap());

    let result = repo.reset_password(actor, hr).await;
    assert!(matches!(result, Err(AccountError::ResetNotAllowed)));
    assert_eq!(AccountError::ResetNotAllowed.status_code(), 403);
}
