//! Account repository: employee accounts and passwords.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use payroll_core::account::{
    AccountError, DEFAULT_PASSWORD, EmployeeAccount, Role, hash_password, validate_new_password,
};

use crate::entities::{sea_orm_active_enums::UserRole, users};

/// Input for creating an account by hand.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Login name.
    pub username: String,
    /// HR employee number, if any.
    pub employee_id: Option<String>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Role.
    pub role: Role,
    /// Plain password; hashed before storage.
    pub password: String,
    /// Force a password change at next use.
    pub must_change_password: bool,
}

/// Converts a user row to the domain account.
#[must_use]
pub fn to_account(model: users::Model) -> EmployeeAccount {
    EmployeeAccount {
        id: model.id,
        username: model.username,
        employee_id: model.employee_id,
        first_name: model.first_name,
        last_name: model.last_name,
        role: model.role.into(),
        branch_name: model.branch_name,
        bank_account_number: model.bank_account_number,
        base_salary: model.base_salary,
        must_change_password: model.must_change_password,
        is_active: model.is_active,
    }
}

fn db_err(e: DbErr) -> AccountError {
    AccountError::Database(e.to_string())
}

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<EmployeeAccount>, AccountError> {
        users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map(|m| m.map(to_account))
            .map_err(db_err)
    }

    /// Finds an account by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<EmployeeAccount>, AccountError> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map(|m| m.map(to_account))
            .map_err(db_err)
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails or the username is taken.
    pub async fn create(&self, input: CreateAccountInput) -> Result<EmployeeAccount, AccountError> {
        let password_hash = hash_password(&input.password)?;
        let now = Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::now_v7()),
            username: Set(input.username),
            employee_id: Set(input.employee_id),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            role: Set(input.role.into()),
            branch_name: Set(String::new()),
            bank_account_number: Set(String::new()),
            base_salary: Set(None),
            password_hash: Set(password_hash),
            must_change_password: Set(input.must_change_password),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        user.insert(&self.db).await.map(to_account).map_err(db_err)
    }

    /// Changes the caller's own password and clears the must-change flag.
    ///
    /// # Errors
    ///
    /// Returns the first failing password rule, `NotFound` for an unknown
    /// account, or a database error.
    pub async fn change_password(
        &self,
        account_id: Uuid,
        new_password: &str,
        confirmation: &str,
    ) -> Result<(), AccountError> {
        validate_new_password(new_password, confirmation)?;

        let user = users::Entity::find_by_id(account_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(AccountError::NotFound(account_id))?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(hash_password(new_password)?);
        active.must_change_password = Set(false);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await.map_err(db_err)?;

        tracing::info!(account_id = %account_id, "password changed");
        Ok(())
    }

    /// Resets an employee's password to the default one and forces a change.
    ///
    /// # Errors
    ///
    /// Returns `ResetNotAllowed` unless the target has the `user` role.
    pub async fn reset_password(&self, actor_id: Uuid, target_id: Uuid) -> Result<(), AccountError> {
        let user = users::Entity::find_by_id(target_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(AccountError::NotFound(target_id))?;

        if user.role != UserRole::User {
            return Err(AccountError::ResetNotAllowed);
        }

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(hash_password(DEFAULT_PASSWORD)?);
        active.must_change_password = Set(true);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await.map_err(db_err)?;

        tracing::info!(actor_id = %actor_id, account_id = %target_id, "password reset to default");
        Ok(())
    }

    /// Returns the stored password hash of an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn password_hash(&self, account_id: Uuid) -> Result<Option<String>, AccountError> {
        users::Entity::find_by_id(account_id)
            .one(&self.db)
            .await
            .map(|m| m.map(|u| u.password_hash))
            .map_err(db_err)
    }
}
