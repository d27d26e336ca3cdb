//! Loan ledger routes (admin only).

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use chrono::Utc;
use payroll_core::loan::{BorrowerType, LoanFilter, LoanStatus, NewLoan, RepaymentType};
use payroll_db::LoanRepository;
use payroll_shared::types::PageRequest;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};

/// Creates the loan routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/loans", get(list_loans).post(add_loan))
        .route("/loans/inquiry", get(inquiry))
        .route("/loans/prefill", get(prefill))
        .route("/loans/activity", get(activity))
        .route("/loans/{loan_number}", get(loan_detail))
        .route("/loans/{loan_number}/collections", post(collect))
        .route("/loans/{loan_number}/status", patch(update_status))
        .route("/collections/{collection_id}", delete(delete_collection))
}

/// Loan list filters, as strings so that `status=all` can be told apart.
#[derive(Debug, Default, Deserialize)]
pub struct LoanListQuery {
    /// `active` (default), `closed`, `bad_debt` or `all`.
    #[serde(default)]
    pub status: Option<String>,
    /// `monthly` or `oneoff`.
    #[serde(default)]
    pub repayment_type: Option<String>,
    /// `employee` or `external`.
    #[serde(default)]
    pub borrower_type: Option<String>,
    /// National id fragment.
    #[serde(default)]
    pub national_id: Option<String>,
}

impl LoanListQuery {
    fn into_filter(self) -> ApiResult<LoanFilter> {
        let status = match non_blank(self.status).as_deref() {
            None => Some(LoanStatus::Active),
            Some("all") => None,
            Some(s) => Some(
                LoanStatus::parse(s)
                    .ok_or_else(|| ApiError::validation(format!("Unknown loan status: {s}")))?,
            ),
        };
        let repayment_type = non_blank(self.repayment_type)
            .map(|s| {
                RepaymentType::parse(&s)
                    .ok_or_else(|| ApiError::validation(format!("Unknown repayment type: {s}")))
            })
            .transpose()?;
        let borrower_type = non_blank(self.borrower_type)
            .map(|s| {
                BorrowerType::parse(&s)
                    .ok_or_else(|| ApiError::validation(format!("Unknown borrower type: {s}")))
            })
            .transpose()?;

        Ok(LoanFilter {
            status,
            repayment_type,
            borrower_type,
            national_id: non_blank(self.national_id),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// National id query parameter.
#[derive(Debug, Deserialize)]
pub struct NationalIdQuery {
    /// Borrower national id.
    #[serde(default)]
    pub nid: String,
}

/// Request body for a collection.
#[derive(Debug, Deserialize)]
pub struct CollectRequest {
    /// Amount collected.
    pub amount: Decimal,
    /// Free text note.
    #[serde(default)]
    pub note: String,
}

/// Request body for a manual status change.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// `active`, `closed` or `bad_debt`.
    pub status: String,
}

fn repo(state: &AppState) -> LoanRepository {
    LoanRepository::new((*state.db).clone())
}

/// POST `/loans` - Issue a loan, creating the borrower when needed.
async fn add_loan(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<NewLoan>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let loan = repo(&state)
        .add_loan(auth.account_id(), payload, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "loan": loan }))))
}

/// GET `/loans` - Filtered, paginated loans.
async fn list_loans(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<LoanListQuery>,
    Query(page): Query<PageRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let filter = query.into_filter()?;
    let page = repo(&state).list(&filter, &page).await?;
    Ok(Json(page))
}

/// GET `/loans/{loan_number}` - A loan with borrower and collections.
async fn loan_detail(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(loan_number): Path<String>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let detail = repo(&state).detail(&loan_number).await?;
    Ok(Json(detail))
}

/// POST `/loans/{loan_number}/collections` - Record a repayment.
async fn collect(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(loan_number): Path<String>,
    Json(payload): Json<CollectRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let loan = repo(&state)
        .collect(
            auth.account_id(),
            &loan_number,
            payload.amount,
            payload.note.trim(),
            Utc::now(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "loan": loan }))))
}

/// DELETE `/collections/{collection_id}` - Undo a repayment.
async fn delete_collection(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(collection_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let loan = repo(&state)
        .delete_collection(auth.account_id(), collection_id)
        .await?;
    Ok(Json(json!({ "ok": true, "loan": loan })))
}

/// PATCH `/loans/{loan_number}/status` - Change the status, then recompute.
async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(loan_number): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let status = LoanStatus::parse(payload.status.trim())
        .ok_or_else(|| ApiError::validation(format!("Unknown loan status: {}", payload.status)))?;
    let loan = repo(&state)
        .update_status(auth.account_id(), &loan_number, status)
        .await?;
    Ok(Json(json!({ "ok": true, "loan": loan })))
}

/// GET `/loans/inquiry?nid=` - Everything owed by one national id.
async fn inquiry(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<NationalIdQuery>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let inquiry = repo(&state).inquiry(query.nid.trim()).await?;
    Ok(Json(json!({ "ok": true, "inquiry": inquiry })))
}

/// GET `/loans/prefill?nid=` - Stored borrower details for the new-loan form.
async fn prefill(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<NationalIdQuery>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let borrower = repo(&state).prefill(query.nid.trim()).await?;
    Ok(Json(json!({ "ok": true, "borrower": borrower })))
}

/// GET `/loans/activity` - Read-only ledger activity, newest first.
async fn activity(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let page = repo(&state).activity(&page).await?;
    Ok(Json(page))
}
