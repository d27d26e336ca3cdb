//! Advance repository: periods, requests and the admin approval phases.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Set, SqlErr, TransactionTrait, prelude::DateTimeWithTimeZone, sea_query::Expr,
};
use serde::Serialize;
use uuid::Uuid;

use payroll_core::advance::{
    AdminDecision, AdminEdit, AdvanceError, AdvancePeriod, AdvanceRequest, AdvanceType,
    AdvanceWorkflow, CycleFilter, Eligibility, Finalization, PeriodSettings, RequestFilter,
    SubmitAdvance, completed_cycle_users,
};
use payroll_shared::types::{PageRequest, PageResponse};

use super::account::to_account;
use super::lower_contains;
use crate::entities::{
    advance_periods, advance_requests,
    sea_orm_active_enums::{
        AdminDecision as DbDecision, AdvanceStatus as DbStatus, AdvanceType as DbType,
    },
    users,
};

/// Converts a period row to the domain type.
#[must_use]
pub fn to_period(model: advance_periods::Model) -> AdvancePeriod {
    AdvancePeriod {
        id: model.id,
        advance_type: model.advance_type.into(),
        start_date: model.start_date,
        end_date: model.end_date,
        is_active: model.is_active,
    }
}

/// Converts a request row to the domain type.
#[must_use]
pub fn to_request(model: advance_requests::Model) -> AdvanceRequest {
    AdvanceRequest {
        id: model.id,
        user_id: model.user_id,
        advance_type: model.advance_type.into(),
        period_id: model.period_id,
        amount: model.amount,
        notes: model.notes,
        status: model.status.into(),
        admin_decision: model.admin_decision.map(Into::into),
        user_locked: model.user_locked,
        locked: model.locked,
        created_at: model.created_at.into(),
        updated_at: model.updated_at.into(),
    }
}

fn db_err(e: DbErr) -> AdvanceError {
    AdvanceError::Database(e.to_string())
}

/// Maps a failed request insert. The unique (user, type, period) index
/// catches a concurrent submit that passed the duplicate check.
fn insert_err(e: DbErr, advance_type: AdvanceType) -> AdvanceError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AdvanceError::AlreadyRequested { advance_type }
        }
        _ => db_err(e),
    }
}

/// What the employee portal shows: eligibility, open windows and the
/// caller's requests in the current periods.
#[derive(Debug, Clone, Serialize)]
pub struct EligibilityView {
    /// Amount range and overall eligibility.
    #[serde(flatten)]
    pub eligibility: Eligibility,
    /// Types whose period is open today.
    pub open_types: Vec<AdvanceType>,
    /// The caller's requests in the effective periods.
    pub requests: Vec<AdvanceRequest>,
}

/// Admin list row with the requesting employee.
#[derive(Debug, Clone, Serialize)]
pub struct AdminRequestView {
    /// The request.
    #[serde(flatten)]
    pub request: AdvanceRequest,
    /// Requester's username.
    pub username: String,
    /// Requester's display name.
    pub employee_name: String,
    /// Requester's base salary.
    pub base_salary: Option<Decimal>,
}

/// Outcome of the monthly reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResetSummary {
    /// Requests deleted.
    pub deleted_requests: u64,
    /// Periods deactivated.
    pub deactivated_periods: u64,
}

/// Advance repository.
#[derive(Debug, Clone)]
pub struct AdvanceRepository {
    db: DatabaseConnection,
}

impl AdvanceRepository {
    /// Creates a new advance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Periods
    // ========================================================================

    /// Returns the effective period of every type, creating missing ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn periods(&self, today: NaiveDate) -> Result<Vec<AdvancePeriod>, AdvanceError> {
        let mut periods = Vec::with_capacity(AdvanceType::ALL.len());
        for advance_type in AdvanceType::ALL {
            let model = effective_period(&self.db, advance_type, today).await?;
            periods.push(to_period(model));
        }
        Ok(periods)
    }

    /// Saves the window of a type and deactivates every other period of it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPeriodRange` if the end precedes the start.
    pub async fn configure_period(
        &self,
        advance_type: AdvanceType,
        settings: PeriodSettings,
        today: NaiveDate,
    ) -> Result<AdvancePeriod, AdvanceError> {
        let settings = AdvanceWorkflow::configure_period(settings)?;

        let txn = self.db.begin().await.map_err(db_err)?;
        let current = effective_period(&txn, advance_type, today).await?;
        let period_id = current.id;

        let mut active: advance_periods::ActiveModel = current.into();
        active.start_date = Set(settings.start_date);
        active.end_date = Set(settings.end_date);
        active.is_active = Set(settings.is_active);
        active.updated_at = Set(Utc::now().into());
        let saved = active.update(&txn).await.map_err(db_err)?;

        advance_periods::Entity::update_many()
            .col_expr(advance_periods::Column::IsActive, Expr::value(false))
            .filter(advance_periods::Column::AdvanceType.eq(DbType::from(advance_type)))
            .filter(advance_periods::Column::Id.ne(period_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        tracing::info!(
            advance_type = %advance_type,
            start = %settings.start_date,
            end = %settings.end_date,
            active = settings.is_active,
            "advance period configured"
        );
        Ok(to_period(saved))
    }

    /// Returns the latest active period of a type, open or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn active_period(
        &self,
        advance_type: AdvanceType,
    ) -> Result<Option<AdvancePeriod>, AdvanceError> {
        advance_periods::Entity::find()
            .filter(advance_periods::Column::AdvanceType.eq(DbType::from(advance_type)))
            .filter(advance_periods::Column::IsActive.eq(true))
            .order_by_desc(advance_periods::Column::StartDate)
            .one(&self.db)
            .await
            .map(|m| m.map(to_period))
            .map_err(db_err)
    }

    // ========================================================================
    // Employee side
    // ========================================================================

    /// Evaluates what the employee may request today.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn eligibility(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<EligibilityView, AdvanceError> {
        let base_salary = self.base_salary(user_id).await?;

        let mut open_types = Vec::new();
        for advance_type in AdvanceType::ALL {
            if self
                .active_period(advance_type)
                .await?
                .is_some_and(|p| p.is_open_on(today))
            {
                open_types.push(advance_type);
            }
        }

        let period_ids: Vec<Uuid> = self.periods(today).await?.iter().map(|p| p.id).collect();
        let requests = advance_requests::Entity::find()
            .filter(advance_requests::Column::UserId.eq(user_id))
            .filter(advance_requests::Column::PeriodId.is_in(period_ids))
            .order_by_desc(advance_requests::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(to_request)
            .collect();

        Ok(EligibilityView {
            eligibility: Eligibility::evaluate(base_salary, !open_types.is_empty()),
            open_types,
            requests,
        })
    }

    /// Files a new request.
    ///
    /// # Errors
    ///
    /// Returns the first failing submission rule.
    pub async fn submit(
        &self,
        user_id: Uuid,
        today: NaiveDate,
        input: SubmitAdvance,
    ) -> Result<AdvanceRequest, AdvanceError> {
        let period = self.active_period(input.advance_type).await?;
        let base_salary = self.base_salary(user_id).await?;

        let already_requested = match &period {
            Some(p) => {
                advance_requests::Entity::find()
                    .filter(advance_requests::Column::UserId.eq(user_id))
                    .filter(advance_requests::Column::AdvanceType.eq(DbType::from(input.advance_type)))
                    .filter(advance_requests::Column::PeriodId.eq(p.id))
                    .count(&self.db)
                    .await
                    .map_err(db_err)?
                    > 0
            }
            None => false,
        };

        let new = AdvanceWorkflow::submit(
            user_id,
            period.as_ref(),
            today,
            base_salary,
            already_requested,
            input,
        )?;

        let advance_type = new.advance_type;
        let now = Utc::now().into();
        let model = advance_requests::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(new.user_id),
            advance_type: Set(advance_type.into()),
            period_id: Set(new.period_id),
            amount: Set(new.amount),
            notes: Set(new.notes),
            status: Set(DbStatus::UnderReview),
            admin_decision: Set(None),
            user_locked: Set(false),
            locked: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let saved = model
            .insert(&self.db)
            .await
            .map_err(|e| insert_err(e, advance_type))?;
        tracing::info!(request_id = %saved.id, user_id = %user_id, amount = %saved.amount, "advance requested");
        Ok(to_request(saved))
    }

    /// Changes the amount (and optionally the notes) of the caller's request.
    ///
    /// # Errors
    ///
    /// Returns `NotAllowedNow` once the request is decided or locked.
    pub async fn owner_update(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        amount: Decimal,
        notes: Option<String>,
    ) -> Result<AdvanceRequest, AdvanceError> {
        let model = self.find_model(request_id).await?;
        let base_salary = self.base_salary(actor_id).await?;
        let amount = AdvanceWorkflow::owner_edit(&to_request(model.clone()), actor_id, base_salary, amount)?;

        let mut active: advance_requests::ActiveModel = model.into();
        active.amount = Set(amount);
        if let Some(notes) = notes {
            active.notes = Set(notes.trim().to_string());
        }
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map(to_request).map_err(db_err)
    }

    /// Withdraws the caller's request.
    ///
    /// # Errors
    ///
    /// Returns `NotAllowedNow` once the request is decided or locked.
    pub async fn owner_delete(&self, request_id: Uuid, actor_id: Uuid) -> Result<(), AdvanceError> {
        let model = self.find_model(request_id).await?;
        AdvanceWorkflow::ensure_owner_can_modify(&to_request(model), actor_id)?;

        advance_requests::Entity::delete_by_id(request_id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Lists the caller's requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_own(&self, user_id: Uuid) -> Result<Vec<AdvanceRequest>, AdvanceError> {
        advance_requests::Entity::find()
            .filter(advance_requests::Column::UserId.eq(user_id))
            .order_by_desc(advance_requests::Column::CreatedAt)
            .all(&self.db)
            .await
            .map(|models| models.into_iter().map(to_request).collect())
            .map_err(db_err)
    }

    // ========================================================================
    // Admin side
    // ========================================================================

    /// Lists requests for the admin, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn admin_list(
        &self,
        filter: &RequestFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<AdminRequestView>, AdvanceError> {
        let page = page.clamped();

        let mut query = advance_requests::Entity::find()
            .join(JoinType::InnerJoin, advance_requests::Relation::Users.def());

        if let Some(status) = filter.status {
            query = query.filter(advance_requests::Column::Status.eq(DbStatus::from(status)));
        }
        if let Some(advance_type) = filter.advance_type {
            query = query.filter(advance_requests::Column::AdvanceType.eq(DbType::from(advance_type)));
        }
        match filter.complete {
            Some(true) => {
                query = query.filter(advance_requests::Column::Status.ne(DbStatus::UnderReview));
            }
            Some(false) => {
                query = query.filter(advance_requests::Column::Status.eq(DbStatus::UnderReview));
            }
            None => {}
        }
        if let Some(cycle) = filter.cycle {
            let completed: Vec<Uuid> = self.completed_cycle_users().await?.into_iter().collect();
            query = match cycle {
                CycleFilter::Complete => query.filter(advance_requests::Column::UserId.is_in(completed)),
                CycleFilter::Incomplete => {
                    query.filter(advance_requests::Column::UserId.is_not_in(completed))
                }
            };
        }
        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(lower_contains(users::Column::Username, q))
                    .add(lower_contains(users::Column::FirstName, q))
                    .add(lower_contains(users::Column::LastName, q)),
            );
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let models = query
            .order_by_desc(advance_requests::Column::CreatedAt)
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
                AdminRequestView {
                    username: owner.as_ref().map(|o| o.username.clone()).unwrap_or_default(),
                    employee_name: owner.as_ref().map(|o| o.full_name()).unwrap_or_default(),
                    base_salary: owner.and_then(|o| o.base_salary),
                    request: to_request(model),
                }
            })
            .collect();

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Records a provisional decision on one request.
    ///
    /// # Errors
    ///
    /// Returns `RequestLocked` once the request is finalized.
    pub async fn propose(
        &self,
        request_id: Uuid,
        decision: AdminDecision,
    ) -> Result<AdvanceRequest, AdvanceError> {
        let model = self.find_model(request_id).await?;
        let proposal = AdvanceWorkflow::propose(&to_request(model.clone()), decision)?;

        let mut active: advance_requests::ActiveModel = model.into();
        active.admin_decision = Set(Some(proposal.admin_decision.into()));
        active.user_locked = Set(proposal.user_locked);
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map(to_request).map_err(db_err)
    }

    /// Records `decision` on every undecided request under review.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn propose_rest(&self, decision: AdminDecision) -> Result<u64, AdvanceError> {
        let result = advance_requests::Entity::update_many()
            .col_expr(
                advance_requests::Column::AdminDecision,
                Expr::value(Some(DbDecision::from(decision))),
            )
            .col_expr(advance_requests::Column::UserLocked, Expr::value(true))
            .col_expr(
                advance_requests::Column::UpdatedAt,
                Expr::value(DateTimeWithTimeZone::from(Utc::now())),
            )
            .filter(advance_requests::Column::Status.eq(DbStatus::UnderReview))
            .filter(advance_requests::Column::AdminDecision.is_null())
            .filter(advance_requests::Column::Locked.eq(false))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        tracing::info!(decision = decision.as_str(), count = result.rows_affected, "bulk decision recorded");
        Ok(result.rows_affected)
    }

    /// Turns every provisional decision into a final status.
    ///
    /// Nothing is written while any request under review lacks a decision.
    ///
    /// # Errors
    ///
    /// Returns `UndecidedRequests` with the number of blocking requests.
    pub async fn finalize(&self) -> Result<Vec<Finalization>, AdvanceError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let pending: Vec<AdvanceRequest> = advance_requests::Entity::find()
            .filter(advance_requests::Column::Status.eq(DbStatus::UnderReview))
            .all(&txn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(to_request)
            .collect();

        let plan = AdvanceWorkflow::finalize(&pending)?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        for step in &plan {
            advance_requests::Entity::update_many()
                .col_expr(advance_requests::Column::Status, Expr::value(DbStatus::from(step.status)))
                .col_expr(advance_requests::Column::Locked, Expr::value(true))
                .col_expr(advance_requests::Column::UserLocked, Expr::value(true))
                .col_expr(advance_requests::Column::UpdatedAt, Expr::value(now))
                .filter(advance_requests::Column::Id.eq(step.request_id))
                .exec(&txn)
                .await
                .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;

        tracing::info!(count = plan.len(), "advance requests finalized");
        Ok(plan)
    }

    /// Edits a request that is not finalized yet.
    ///
    /// # Errors
    ///
    /// Returns `RequestLocked` once finalized, or an amount range error.
    pub async fn admin_edit(
        &self,
        request_id: Uuid,
        edit: AdminEdit,
    ) -> Result<AdvanceRequest, AdvanceError> {
        let model = self.find_model(request_id).await?;
        let base_salary = self.base_salary(model.user_id).await?;
        let outcome = AdvanceWorkflow::admin_edit(&to_request(model.clone()), base_salary, edit)?;

        let mut active: advance_requests::ActiveModel = model.into();
        active.amount = Set(outcome.amount);
        active.notes = Set(outcome.notes);
        active.admin_decision = Set(outcome.admin_decision.map(Into::into));
        active.user_locked = Set(outcome.user_locked);
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map(to_request).map_err(db_err)
    }

    /// Deletes every request and deactivates every period.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn monthly_reset(&self) -> Result<ResetSummary, AdvanceError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let deleted = advance_requests::Entity::delete_many()
            .exec(&txn)
            .await
            .map_err(db_err)?;
        let deactivated = advance_periods::Entity::update_many()
            .col_expr(advance_periods::Column::IsActive, Expr::value(false))
            .filter(advance_periods::Column::IsActive.eq(true))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        let summary = ResetSummary {
            deleted_requests: deleted.rows_affected,
            deactivated_periods: deactivated.rows_affected,
        };
        tracing::warn!(?summary, "advance cycle reset");
        Ok(summary)
    }

    /// Deletes every FIRST-type request.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete_first_requests(&self) -> Result<u64, AdvanceError> {
        let result = advance_requests::Entity::delete_many()
            .filter(advance_requests::Column::AdvanceType.eq(DbType::First))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        tracing::warn!(count = result.rows_affected, "first advance requests deleted");
        Ok(result.rows_affected)
    }

    async fn find_model(&self, request_id: Uuid) -> Result<advance_requests::Model, AdvanceError> {
        advance_requests::Entity::find_by_id(request_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(AdvanceError::RequestNotFound(request_id))
    }

    async fn base_salary(&self, user_id: Uuid) -> Result<Option<Decimal>, AdvanceError> {
        users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map(|u| u.and_then(|u| u.base_salary))
            .map_err(db_err)
    }

    async fn completed_cycle_users(&self) -> Result<HashSet<Uuid>, AdvanceError> {
        let finalized: Vec<(Uuid, DbType)> = advance_requests::Entity::find()
            .select_only()
            .column(advance_requests::Column::UserId)
            .column(advance_requests::Column::AdvanceType)
            .join(JoinType::InnerJoin, advance_requests::Relation::AdvancePeriods.def())
            .filter(advance_periods::Column::IsActive.eq(true))
            .filter(advance_requests::Column::Status.ne(DbStatus::UnderReview))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(completed_cycle_users(
            finalized.into_iter().map(|(user_id, t)| (user_id, t.into())),
        ))
    }
}

/// Returns the effective period of a type: the active one if any, else the
/// most recent. A missing period is created inactive on `today`.
async fn effective_period<C: ConnectionTrait>(
    conn: &C,
    advance_type: AdvanceType,
    today: NaiveDate,
) -> Result<advance_periods::Model, AdvanceError> {
    let existing = advance_periods::Entity::find()
        .filter(advance_periods::Column::AdvanceType.eq(DbType::from(advance_type)))
        .order_by_desc(advance_periods::Column::IsActive)
        .order_by_desc(advance_periods::Column::StartDate)
        .one(conn)
        .await
        .map_err(db_err)?;

    if let Some(period) = existing {
        return Ok(period);
    }

    let now = Utc::now().into();
    advance_periods::ActiveModel {
        id: Set(Uuid::now_v7()),
        advance_type: Set(advance_type.into()),
        start_date: Set(today),
        end_date: Set(today),
        is_active: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
    .map_err(db_err)
}

#[cfg(test)]
#[path = "advance_tests.rs"]
mod advance_tests;
