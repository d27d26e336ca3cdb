//! Loan ledger repository.
//!
//! Every mutation runs in one transaction that also recomputes the loan and
//! borrower totals and appends an activity log entry for the actor.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use payroll_core::loan::{
    ActivityAction, Borrower, BorrowerTotals, Collection, InquirySummary, Loan, LoanError,
    LoanFilter, LoanStatus, NewLoan, loan_number_prefix, next_loan_number, recompute_loan,
    validate_collection, validate_national_id, validate_new_loan,
};
use payroll_shared::types::{PageRequest, PageResponse};

use crate::entities::{
    activity_logs, borrowers, collections, loans,
    sea_orm_active_enums::{
        BorrowerType as DbBorrowerType, LoanStatus as DbLoanStatus, RepaymentType as DbRepayment,
    },
};

fn db_err(e: DbErr) -> LoanError {
    LoanError::Database(e.to_string())
}

/// Converts a borrower row to the domain type.
#[must_use]
pub fn to_borrower(model: borrowers::Model) -> Borrower {
    Borrower {
        id: model.id,
        national_id: model.national_id,
        full_name: model.full_name,
        phone: model.phone,
        address: model.address,
        borrower_type: model.borrower_type.into(),
        loans_count: model.loans_count,
        loans_total: model.loans_total,
        loans_total_paid: model.loans_total_paid,
        loans_total_remaining: model.loans_total_remaining,
    }
}

/// Converts a loan row to the domain type.
#[must_use]
pub fn to_loan(model: loans::Model) -> Loan {
    Loan {
        id: model.id,
        loan_number: model.loan_number,
        borrower_id: model.borrower_id,
        amount: model.amount,
        status: model.status.into(),
        repayment_type: model.repayment_type.into(),
        monthly_installment: model.monthly_installment,
        received_at: model.received_at.into(),
        maturity_date: model.maturity_date,
        total_paid: model.total_paid,
        total_remaining: model.total_remaining,
        last_collection_at: model.last_collection_at.map(Into::into),
        last_collect_amount: model.last_collect_amount,
    }
}

fn to_collection(model: collections::Model) -> Collection {
    Collection {
        id: model.id,
        loan_id: model.loan_id,
        amount: model.amount,
        collected_at: model.collected_at.into(),
        note: model.note,
    }
}

/// Loan list row with its borrower.
#[derive(Debug, Clone, Serialize)]
pub struct LoanListItem {
    /// The loan.
    #[serde(flatten)]
    pub loan: Loan,
    /// Borrower national id.
    pub national_id: String,
    /// Borrower name.
    pub full_name: String,
}

/// A loan with its borrower and repayment history.
#[derive(Debug, Clone, Serialize)]
pub struct LoanDetail {
    /// The loan.
    pub loan: Loan,
    /// Its borrower.
    pub borrower: Borrower,
    /// Collections, newest first.
    pub collections: Vec<Collection>,
}

/// Result of the national-id inquiry.
#[derive(Debug, Clone, Serialize)]
pub struct Inquiry {
    /// The borrower.
    pub borrower: Borrower,
    /// All of the borrower's loans, newest first.
    pub loans: Vec<Loan>,
    /// Aggregates over `loans`.
    pub summary: InquirySummary,
}

/// One activity log entry.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    /// Entry ID.
    pub id: Uuid,
    /// Who acted.
    pub actor_id: Option<Uuid>,
    /// What was done.
    pub action: String,
    /// Loan involved.
    pub loan_id: Option<Uuid>,
    /// Borrower involved.
    pub borrower_id: Option<Uuid>,
    /// Amount involved.
    pub amount: Option<Decimal>,
    /// Free-form details.
    pub details: serde_json::Value,
    /// When.
    pub created_at: DateTime<Utc>,
}

fn to_activity(model: activity_logs::Model) -> ActivityEntry {
    ActivityEntry {
        id: model.id,
        actor_id: model.actor_id,
        action: model.action,
        loan_id: model.loan_id,
        borrower_id: model.borrower_id,
        amount: model.amount,
        details: serde_json::from_str(&model.details).unwrap_or(serde_json::Value::Null),
        created_at: model.created_at.into(),
    }
}

/// Loan ledger repository.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    db: DatabaseConnection,
}

impl LoanRepository {
    /// Creates a new loan repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Issues a loan, creating the borrower on first sight of the national id.
    ///
    /// # Errors
    ///
    /// Returns a validation error, or `FullNameRequired` for an unknown
    /// borrower without a name.
    pub async fn add_loan(
        &self,
        actor_id: Uuid,
        input: NewLoan,
        received_at: DateTime<Utc>,
    ) -> Result<Loan, LoanError> {
        validate_new_loan(&input)?;
        let national_id = input.national_id.trim().to_string();

        let txn = self.db.begin().await.map_err(db_err)?;
        let now = Utc::now().into();

        let existing = borrowers::Entity::find()
            .filter(borrowers::Column::NationalId.eq(national_id.as_str()))
            .one(&txn)
            .await
            .map_err(db_err)?;

        let details = &input.borrower;
        let borrower = if let Some(borrower) = existing {
            let mut active: borrowers::ActiveModel = borrower.into();
            if !details.full_name.trim().is_empty() {
                active.full_name = Set(details.full_name.trim().to_string());
            }
            if !details.phone.trim().is_empty() {
                active.phone = Set(details.phone.trim().to_string());
            }
            if !details.address.trim().is_empty() {
                active.address = Set(details.address.trim().to_string());
            }
            if let Some(borrower_type) = details.borrower_type {
                active.borrower_type = Set(borrower_type.into());
            }
            active.updated_at = Set(now);
            active.update(&txn).await.map_err(db_err)?
        } else {
            if details.full_name.trim().is_empty() {
                return Err(LoanError::FullNameRequired);
            }
            borrowers::ActiveModel {
                id: Set(Uuid::now_v7()),
                national_id: Set(national_id.clone()),
                full_name: Set(details.full_name.trim().to_string()),
                phone: Set(details.phone.trim().to_string()),
                address: Set(details.address.trim().to_string()),
                borrower_type: Set(details.borrower_type.unwrap_or_default().into()),
                loans_count: Set(0),
                loans_total: Set(Decimal::ZERO),
                loans_total_paid: Set(Decimal::ZERO),
                loans_total_remaining: Set(Decimal::ZERO),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?
        };

        let prefix = loan_number_prefix(received_at.date_naive());
        let taken: Vec<String> = loans::Entity::find()
            .select_only()
            .column(loans::Column::LoanNumber)
            .filter(loans::Column::LoanNumber.starts_with(prefix.as_str()))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(db_err)?;
        let loan_number = next_loan_number(received_at.date_naive(), &taken);

        let totals = recompute_loan(input.amount, LoanStatus::Active, &[]);
        let loan = loans::ActiveModel {
            id: Set(Uuid::now_v7()),
            loan_number: Set(loan_number),
            borrower_id: Set(borrower.id),
            amount: Set(input.amount),
            status: Set(totals.status.into()),
            repayment_type: Set(input.repayment_type.into()),
            monthly_installment: Set(input.monthly_installment),
            received_at: Set(received_at.into()),
            maturity_date: Set(input.maturity_date),
            total_paid: Set(totals.total_paid),
            total_remaining: Set(totals.total_remaining),
            last_collection_at: Set(None),
            last_collect_amount: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        refresh_borrower(&txn, borrower.id).await?;
        log_activity(
            &txn,
            actor_id,
            ActivityAction::AddLoan,
            &loan,
            Some(loan.amount),
            json!({ "loan_number": loan.loan_number, "national_id": national_id }),
        )
        .await?;

        txn.commit().await.map_err(db_err)?;

        tracing::info!(loan_number = %loan.loan_number, amount = %loan.amount, "loan added");
        Ok(to_loan(loan))
    }

    /// Records a repayment and recomputes the totals.
    ///
    /// # Errors
    ///
    /// Returns `LoanNotFound`, or a collection rule violation.
    pub async fn collect(
        &self,
        actor_id: Uuid,
        loan_number: &str,
        amount: Decimal,
        note: &str,
        collected_at: DateTime<Utc>,
    ) -> Result<Loan, LoanError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let loan = find_loan(&txn, loan_number).await?;
        validate_collection(amount, &to_loan(loan.clone()))?;

        collections::ActiveModel {
            id: Set(Uuid::now_v7()),
            loan_id: Set(loan.id),
            amount: Set(amount),
            collected_at: Set(collected_at.into()),
            note: Set(note.trim().to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let loan = recompute(&txn, loan).await?;
        refresh_borrower(&txn, loan.borrower_id).await?;
        log_activity(
            &txn,
            actor_id,
            ActivityAction::Collect,
            &loan,
            Some(amount),
            json!({ "loan_number": loan.loan_number, "note": note.trim() }),
        )
        .await?;

        txn.commit().await.map_err(db_err)?;

        tracing::info!(loan_number = %loan.loan_number, amount = %amount, "collection recorded");
        Ok(to_loan(loan))
    }

    /// Removes a repayment and recomputes the totals.
    ///
    /// # Errors
    ///
    /// Returns `CollectionNotFound` for an unknown collection.
    pub async fn delete_collection(
        &self,
        actor_id: Uuid,
        collection_id: Uuid,
    ) -> Result<Loan, LoanError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let collection = collections::Entity::find_by_id(collection_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(LoanError::CollectionNotFound(collection_id))?;
        let loan = loans::Entity::find_by_id(collection.loan_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LoanError::LoanNotFound(collection.loan_id.to_string()))?;

        collections::Entity::delete_by_id(collection_id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let loan = recompute(&txn, loan).await?;
        refresh_borrower(&txn, loan.borrower_id).await?;
        log_activity(
            &txn,
            actor_id,
            ActivityAction::DeleteCollection,
            &loan,
            Some(collection.amount),
            json!({ "loan_number": loan.loan_number, "collection_id": collection_id }),
        )
        .await?;

        txn.commit().await.map_err(db_err)?;

        tracing::info!(loan_number = %loan.loan_number, collection_id = %collection_id, "collection deleted");
        Ok(to_loan(loan))
    }

    /// Sets a loan's status by hand, then recomputes it.
    ///
    /// `active` and `closed` are re-derived from the balance; only
    /// `bad_debt` sticks.
    ///
    /// # Errors
    ///
    /// Returns `LoanNotFound` for an unknown loan number.
    pub async fn update_status(
        &self,
        actor_id: Uuid,
        loan_number: &str,
        status: LoanStatus,
    ) -> Result<Loan, LoanError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let loan = find_loan(&txn, loan_number).await?;
        let previous = LoanStatus::from(loan.status);

        let mut active: loans::ActiveModel = loan.into();
        active.status = Set(status.into());
        let loan = active.update(&txn).await.map_err(db_err)?;

        let loan = recompute(&txn, loan).await?;
        refresh_borrower(&txn, loan.borrower_id).await?;
        log_activity(
            &txn,
            actor_id,
            ActivityAction::UpdateStatus,
            &loan,
            None,
            json!({
                "loan_number": loan.loan_number,
                "from": previous.as_str(),
                "to": LoanStatus::from(loan.status).as_str(),
            }),
        )
        .await?;

        txn.commit().await.map_err(db_err)?;
        Ok(to_loan(loan))
    }

    /// Lists loans, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: &LoanFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<LoanListItem>, LoanError> {
        let page = page.clamped();

        let mut query = loans::Entity::find()
            .join(JoinType::InnerJoin, loans::Relation::Borrowers.def());

        if let Some(status) = filter.status {
            query = query.filter(loans::Column::Status.eq(DbLoanStatus::from(status)));
        }
        if let Some(repayment) = filter.repayment_type {
            query = query.filter(loans::Column::RepaymentType.eq(DbRepayment::from(repayment)));
        }
        if let Some(borrower_type) = filter.borrower_type {
            query = query.filter(borrowers::Column::BorrowerType.eq(DbBorrowerType::from(borrower_type)));
        }
        if let Some(nid) = filter.national_id.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            query = query.filter(borrowers::Column::NationalId.contains(nid));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let models = query
            .order_by_desc(loans::Column::ReceivedAt)
            .order_by_desc(loans::Column::LoanNumber)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let borrower_ids: Vec<Uuid> = models.iter().map(|m| m.borrower_id).collect();
        let owners: HashMap<Uuid, borrowers::Model> = borrowers::Entity::find()
            .filter(borrowers::Column::Id.is_in(borrower_ids))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();

        let data = models
            .into_iter()
            .map(|loan| {
                let borrower = owners.get(&loan.borrower_id);
                LoanListItem {
                    national_id: borrower.map(|b| b.national_id.clone()).unwrap_or_default(),
                    full_name: borrower.map(|b| b.full_name.clone()).unwrap_or_default(),
                    loan: to_loan(loan),
                }
            })
            .collect();

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Returns a loan with its borrower and collections.
    ///
    /// # Errors
    ///
    /// Returns `LoanNotFound` for an unknown loan number.
    pub async fn detail(&self, loan_number: &str) -> Result<LoanDetail, LoanError> {
        let loan = find_loan(&self.db, loan_number).await?;
        let borrower = borrowers::Entity::find_by_id(loan.borrower_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LoanError::LoanNotFound(loan_number.to_string()))?;
        let history = collections::Entity::find()
            .filter(collections::Column::LoanId.eq(loan.id))
            .order_by_desc(collections::Column::CollectedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(LoanDetail {
            loan: to_loan(loan),
            borrower: to_borrower(borrower),
            collections: history.into_iter().map(to_collection).collect(),
        })
    }

    /// Looks up a borrower and all their loans by national id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNationalId` for a malformed id.
    pub async fn inquiry(&self, national_id: &str) -> Result<Option<Inquiry>, LoanError> {
        let Some(borrower) = self.prefill(national_id).await? else {
            return Ok(None);
        };

        let loans: Vec<Loan> = loans::Entity::find()
            .filter(loans::Column::BorrowerId.eq(borrower.id))
            .order_by_desc(loans::Column::ReceivedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(to_loan)
            .collect();

        Ok(Some(Inquiry {
            summary: InquirySummary::from_loans(&loans),
            borrower,
            loans,
        }))
    }

    /// Returns the stored borrower for a national id, to prefill forms.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNationalId` for a malformed id.
    pub async fn prefill(&self, national_id: &str) -> Result<Option<Borrower>, LoanError> {
        let national_id = national_id.trim();
        validate_national_id(national_id)?;

        borrowers::Entity::find()
            .filter(borrowers::Column::NationalId.eq(national_id))
            .one(&self.db)
            .await
            .map(|b| b.map(to_borrower))
            .map_err(db_err)
    }

    /// Lists the activity log, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn activity(&self, page: &PageRequest) -> Result<PageResponse<ActivityEntry>, LoanError> {
        let page = page.clamped();
        let query = activity_logs::Entity::find();
        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let rows = query
            .order_by_desc(activity_logs::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PageResponse::new(
            rows.into_iter().map(to_activity).collect(),
            page.page,
            page.per_page,
            total,
        ))
    }
}

async fn find_loan<C: ConnectionTrait>(conn: &C, loan_number: &str) -> Result<loans::Model, LoanError> {
    loans::Entity::find()
        .filter(loans::Column::LoanNumber.eq(loan_number))
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| LoanError::LoanNotFound(loan_number.to_string()))
}

/// Rewrites a loan's totals and latest collection from its collections.
async fn recompute<C: ConnectionTrait>(conn: &C, loan: loans::Model) -> Result<loans::Model, LoanError> {
    let history = collections::Entity::find()
        .filter(collections::Column::LoanId.eq(loan.id))
        .order_by_desc(collections::Column::CollectedAt)
        .order_by_desc(collections::Column::CreatedAt)
        .all(conn)
        .await
        .map_err(db_err)?;

    let amounts: Vec<Decimal> = history.iter().map(|c| c.amount).collect();
    let totals = recompute_loan(loan.amount, loan.status.into(), &amounts);
    let latest = history.first();

    let mut active: loans::ActiveModel = loan.into();
    active.total_paid = Set(totals.total_paid);
    active.total_remaining = Set(totals.total_remaining);
    active.status = Set(totals.status.into());
    active.last_collection_at = Set(latest.map(|c| c.collected_at));
    active.last_collect_amount = Set(latest.map_or(Decimal::ZERO, |c| c.amount));
    active.updated_at = Set(Utc::now().into());

    active.update(conn).await.map_err(db_err)
}

/// Rewrites a borrower's denormalized totals from its loans.
async fn refresh_borrower<C: ConnectionTrait>(conn: &C, borrower_id: Uuid) -> Result<(), LoanError> {
    let loans: Vec<Loan> = loans::Entity::find()
        .filter(loans::Column::BorrowerId.eq(borrower_id))
        .all(conn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(to_loan)
        .collect();
    let totals = BorrowerTotals::from_loans(&loans);

    borrowers::ActiveModel {
        id: Set(borrower_id),
        loans_count: Set(totals.loans_count),
        loans_total: Set(totals.loans_total),
        loans_total_paid: Set(totals.loans_total_paid),
        loans_total_remaining: Set(totals.loans_total_remaining),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .update(conn)
    .await
    .map_err(db_err)?;
    Ok(())
}

async fn log_activity<C: ConnectionTrait>(
    conn: &C,
    actor_id: Uuid,
    action: ActivityAction,
    loan: &loans::Model,
    amount: Option<Decimal>,
    details: serde_json::Value,
) -> Result<(), LoanError> {
    activity_logs::ActiveModel {
        id: Set(Uuid::now_v7()),
        actor_id: Set(Some(actor_id)),
        action: Set(action.as_str().to_string()),
        loan_id: Set(Some(loan.id)),
        borrower_id: Set(Some(loan.borrower_id)),
        amount: Set(amount),
        details: Set(details.to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await
    .map_err(db_err)?;
    Ok(())
}
