//! Persistence for the salary import pipeline.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use payroll_core::account::{EmployeeAccount, NewEmployee, ProfileUpdate};
use payroll_core::import::{ImportError, NewSalaryStatement, NewUploadLog, PayrollRepository};

use super::account::to_account;
use crate::entities::{salary_statements, sea_orm_active_enums::UserRole, upload_logs, users};

fn db_err(e: DbErr) -> ImportError {
    ImportError::Database(e.to_string())
}

/// `PayrollRepository` backed by `SeaORM`.
#[derive(Debug, Clone)]
pub struct SalaryImportRepository {
    db: DatabaseConnection,
}

impl SalaryImportRepository {
    /// Creates a new import repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl PayrollRepository for SalaryImportRepository {
    async fn delete_statements_for_month(&self, month: chrono::NaiveDate) -> Result<u64, ImportError> {
        salary_statements::Entity::delete_many()
            .filter(salary_statements::Column::Month.eq(month))
            .exec(&self.db)
            .await
            .map(|r| r.rows_affected)
            .map_err(db_err)
    }

    async fn find_or_create_employee(
        &self,
        employee: &NewEmployee,
        password_hash: &str,
    ) -> Result<(EmployeeAccount, bool), ImportError> {
        let existing = users::Entity::find()
            .filter(users::Column::EmployeeId.eq(employee.employee_id.as_str()))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        if let Some(user) = existing {
            return Ok((to_account(user), false));
        }

        let now = Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::now_v7()),
            username: Set(employee.employee_id.clone()),
            employee_id: Set(Some(employee.employee_id.clone())),
            first_name: Set(employee.first_name.clone()),
            last_name: Set(employee.last_name.clone()),
            role: Set(UserRole::User),
            branch_name: Set(String::new()),
            bank_account_number: Set(String::new()),
            base_salary: Set(None),
            password_hash: Set(password_hash.to_string()),
            must_change_password: Set(true),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let user = user.insert(&self.db).await.map_err(db_err)?;
        Ok((to_account(user), true))
    }

    async fn update_profile(&self, account_id: Uuid, update: &ProfileUpdate) -> Result<(), ImportError> {
        let user = users::Entity::find_by_id(account_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ImportError::Database(format!("account {account_id} disappeared")))?;

        let mut active: users::ActiveModel = user.into();
        if let Some(branch) = &update.branch_name {
            active.branch_name = Set(branch.clone());
        }
        if let Some(bank) = &update.bank_account_number {
            active.bank_account_number = Set(bank.clone());
        }
        if let Some(salary) = update.base_salary {
            active.base_salary = Set(Some(salary));
        }
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn create_statement(&self, statement: &NewSalaryStatement) -> Result<Uuid, ImportError> {
        let items = &statement.line_items;
        let now = Utc::now().into();
        let model = salary_statements::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(statement.user_id),
            month: Set(statement.month),
            base_salary: Set(items.base_salary),
            changed_salary: Set(items.changed_salary),
            special_bonus: Set(items.special_bonus),
            extra: Set(items.extra),
            rest_allowance: Set(items.rest_allowance),
            performance_evaluation: Set(items.performance_evaluation.clone()),
            special_incentive: Set(items.special_incentive),
            meal_allowance: Set(items.meal_allowance),
            transport_allowance: Set(items.transport_allowance),
            total_entitlements: Set(items.total_entitlements),
            loan: Set(items.loan),
            insurance: Set(items.insurance),
            absence: Set(items.absence),
            penalties: Set(items.penalties),
            quality_deduction_cash: Set(items.quality_deduction_cash),
            quality_deduction_days: Set(items.quality_deduction_days),
            installments: Set(items.installments),
            monthly_receipts: Set(items.monthly_receipts),
            total_deductions: Set(items.total_deductions),
            net_salary: Set(items.net_salary),
            notes: Set(statement.notes.clone()),
            updated_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model.insert(&self.db).await.map(|m| m.id).map_err(db_err)
    }

    async fn record_upload(&self, log: &NewUploadLog) -> Result<(), ImportError> {
        let model = upload_logs::ActiveModel {
            id: Set(Uuid::now_v7()),
            uploader_id: Set(Some(log.uploader_id)),
            file_name: Set(log.file_name.clone()),
            sheet_name: Set(log.sheet_name.clone()),
            month: Set(log.month),
            uploaded_at: Set(Utc::now().into()),
        };

        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}
