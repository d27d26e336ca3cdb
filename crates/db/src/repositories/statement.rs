//! Salary statement repository: listing, notes and upload history.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use payroll_core::import::{SalaryLineItems, SalaryStatement, StatementListItem, UploadLog};
use payroll_shared::error::AppError;
use payroll_shared::types::{PageRequest, PageResponse};

use super::account::to_account;
use super::lower_contains;
use crate::entities::{salary_statements, upload_logs, users};

/// Which statements a caller may list.
#[derive(Debug, Clone)]
pub enum StatementScope {
    /// Admin/HR: statements of every active employee, searchable by name
    /// or employee id.
    AllEmployees {
        /// Search text.
        search: Option<String>,
    },
    /// Plain employee: own statements, searchable by employee id.
    Own {
        /// The caller.
        user_id: Uuid,
        /// Search text.
        search: Option<String>,
    },
}

/// Converts a statement row to the domain type.
#[must_use]
pub fn to_statement(model: salary_statements::Model) -> SalaryStatement {
    SalaryStatement {
        id: model.id,
        user_id: model.user_id,
        month: model.month,
        line_items: SalaryLineItems {
            base_salary: model.base_salary,
            changed_salary: model.changed_salary,
            special_bonus: model.special_bonus,
            extra: model.extra,
            rest_allowance: model.rest_allowance,
            performance_evaluation: model.performance_evaluation,
            special_incentive: model.special_incentive,
            meal_allowance: model.meal_allowance,
            transport_allowance: model.transport_allowance,
            total_entitlements: model.total_entitlements,
            loan: model.loan,
            insurance: model.insurance,
            absence: model.absence,
            penalties: model.penalties,
            quality_deduction_cash: model.quality_deduction_cash,
            quality_deduction_days: model.quality_deduction_days,
            installments: model.installments,
            monthly_receipts: model.monthly_receipts,
            total_deductions: model.total_deductions,
            net_salary: model.net_salary,
        },
        notes: model.notes,
        updated_by: model.updated_by,
        created_at: model.created_at.into(),
        updated_at: model.updated_at.into(),
    }
}

fn to_upload_log(model: upload_logs::Model) -> UploadLog {
    UploadLog {
        id: model.id,
        uploader_id: model.uploader_id,
        file_name: model.file_name,
        sheet_name: model.sheet_name,
        month: model.month,
        uploaded_at: model.uploaded_at.into(),
    }
}

fn db_err(e: DbErr) -> AppError {
    AppError::Database(e.to_string())
}

/// Statement repository.
#[derive(Debug, Clone)]
pub struct StatementRepository {
    db: DatabaseConnection,
}

impl StatementRepository {
    /// Creates a new statement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the caller's most recent statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn latest_for_user(&self, user_id: Uuid) -> Result<Option<SalaryStatement>, AppError> {
        salary_statements::Entity::find()
            .filter(salary_statements::Column::UserId.eq(user_id))
            .order_by_desc(salary_statements::Column::Month)
            .order_by_desc(salary_statements::Column::CreatedAt)
            .one(&self.db)
            .await
            .map(|m| m.map(to_statement))
            .map_err(db_err)
    }

    /// Lists statements visible in `scope`, newest month first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        scope: &StatementScope,
        page: &PageRequest,
    ) -> Result<PageResponse<StatementListItem>, AppError> {
        let page = page.clamped();

        let mut query = salary_statements::Entity::find()
            .join(JoinType::InnerJoin, salary_statements::Relation::Users.def());

        match scope {
            StatementScope::AllEmployees { search } => {
                query = query.filter(users::Column::IsActive.eq(true));
                if let Some(q) = search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
                    query = query.filter(
                        Condition::any()
                            .add(lower_contains(users::Column::FirstName, q))
                            .add(lower_contains(users::Column::LastName, q))
                            .add(lower_contains(users::Column::EmployeeId, q)),
                    );
                }
            }
            StatementScope::Own { user_id, search } => {
                query = query.filter(salary_statements::Column::UserId.eq(*user_id));
                if let Some(q) = search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
                    query = query.filter(lower_contains(users::Column::EmployeeId, q));
                }
            }
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let models = query
            .order_by_desc(salary_statements::Column::Month)
            .order_by_desc(salary_statements::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let user_ids: Vec<Uuid> = models.iter().map(|m| m.user_id).collect();
        let owners: HashMap<Uuid, users::Model> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let data = models
            .into_iter()
            .map(|model| {
                let owner = owners.get(&model.user_id).cloned().map(to_account);
                StatementListItem {
                    employee_id: owner.as_ref().and_then(|o| o.employee_id.clone()),
                    employee_name: owner.map(|o| o.full_name()).unwrap_or_default(),
                    statement: to_statement(model),
                }
            })
            .collect();

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Finds a statement by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<SalaryStatement>, AppError> {
        salary_statements::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map(|m| m.map(to_statement))
            .map_err(db_err)
    }

    /// Replaces a statement's notes, stamping the editor.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown statement.
    pub async fn update_notes(
        &self,
        id: Uuid,
        notes: &str,
        actor_id: Uuid,
    ) -> Result<SalaryStatement, AppError> {
        let model = salary_statements::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::NotFound(format!("statement {id}")))?;

        let mut active: salary_statements::ActiveModel = model.into();
        active.notes = Set(notes.trim().to_string());
        active.updated_by = Set(Some(actor_id));
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map(to_statement).map_err(db_err)
    }

    /// Deletes every statement, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete_all(&self, actor_id: Uuid) -> Result<u64, AppError> {
        let result = salary_statements::Entity::delete_many()
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        tracing::warn!(actor_id = %actor_id, deleted = result.rows_affected, "all salary statements deleted");
        Ok(result.rows_affected)
    }

    /// Returns the most recent upload log entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn latest_upload(&self) -> Result<Option<UploadLog>, AppError> {
        upload_logs::Entity::find()
            .order_by_desc(upload_logs::Column::UploadedAt)
            .one(&self.db)
            .await
            .map(|m| m.map(to_upload_log))
            .map_err(db_err)
    }
}
