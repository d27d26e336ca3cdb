//! Salary advance routes.
//!
//! Employees submit and withdraw their own requests while the period is
//! open. Admins propose decisions, then finalize the whole batch at once.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
};
use payroll_core::advance::{
    AdminDecision, AdminEdit, AdvanceType, PeriodSettings, RequestFilter, SubmitAdvance,
};
use payroll_db::AdvanceRepository;
use payroll_shared::types::PageRequest;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};

/// Creates the advance routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/advances", get(list_own).post(submit))
        .route("/advances/eligibility", get(eligibility))
        .route("/advances/{request_id}", patch(owner_update).delete(owner_delete))
        .route("/admin/advances", get(admin_list))
        .route("/admin/advances/periods", get(list_periods))
        .route("/admin/advances/periods/{advance_type}", put(configure_period))
        .route("/admin/advances/propose-rest", post(propose_rest))
        .route("/admin/advances/finalize", post(finalize))
        .route("/admin/advances/reset", post(monthly_reset))
        .route("/admin/advances/first", delete(delete_first_requests))
        .route("/admin/advances/{request_id}", patch(admin_edit))
        .route("/admin/advances/{request_id}/propose", post(propose))
}

/// Request body for an employee edit.
#[derive(Debug, Deserialize)]
pub struct OwnerUpdateRequest {
    /// New amount.
    pub amount: Decimal,
    /// New notes; left unchanged when absent.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body carrying an admin decision.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    /// `APPROVED` or `REJECTED`.
    pub decision: AdminDecision,
}

fn repo(state: &AppState) -> AdvanceRepository {
    AdvanceRepository::new((*state.db).clone())
}

/// GET `/advances/eligibility` - Amount range, open types and own requests.
async fn eligibility(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let view = repo(&state)
        .eligibility(auth.account_id(), state.clock.today())
        .await?;
    Ok(Json(view))
}

/// POST `/advances` - File a request in the open period.
async fn submit(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SubmitAdvance>,
) -> ApiResult<impl IntoResponse> {
    let request = repo(&state)
        .submit(auth.account_id(), state.clock.today(), payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "msg": "Advance request submitted", "request": request })),
    ))
}

/// GET `/advances` - The caller's requests.
async fn list_own(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    let requests = repo(&state).list_own(auth.account_id()).await?;
    Ok(Json(json!({ "ok": true, "requests": requests })))
}

/// PATCH `/advances/{request_id}` - Change an undecided request.
async fn owner_update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<OwnerUpdateRequest>,
) -> ApiResult<impl IntoResponse> {
    let request = repo(&state)
        .owner_update(request_id, auth.account_id(), payload.amount, payload.notes)
        .await?;
    Ok(Json(json!({ "ok": true, "msg": "Advance request updated", "request": request })))
}

/// DELETE `/advances/{request_id}` - Withdraw an undecided request.
async fn owner_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    repo(&state)
        .owner_delete(request_id, auth.account_id())
        .await?;
    Ok(Json(json!({ "ok": true, "msg": "Advance request deleted" })))
}

/// GET `/admin/advances` - Filtered, paginated requests with their employees.
async fn admin_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<RequestFilter>,
    Query(page): Query<PageRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let page = repo(&state).admin_list(&filter, &page).await?;
    Ok(Json(page))
}

/// POST `/admin/advances/{request_id}/propose` - Store a provisional decision.
async fn propose(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<DecisionRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let request = repo(&state).propose(request_id, payload.decision).await?;
    Ok(Json(json!({ "ok": true, "request": request })))
}

/// POST `/admin/advances/propose-rest` - Decide every undecided request at once.
async fn propose_rest(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<DecisionRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let updated = repo(&state).propose_rest(payload.decision).await?;
    info!(actor_id = %auth.account_id(), decision = payload.decision.as_str(), updated, "advance decisions proposed in bulk");
    Ok(Json(json!({ "ok": true, "updated": updated })))
}

/// POST `/admin/advances/finalize` - Apply every proposed decision.
async fn finalize(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let applied = repo(&state).finalize().await?;
    info!(actor_id = %auth.account_id(), finalized = applied.len(), "advance requests finalized");
    Ok(Json(json!({ "ok": true, "finalized": applied.len() })))
}

/// PATCH `/admin/advances/{request_id}` - Edit an unlocked request.
async fn admin_edit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<AdminEdit>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let request = repo(&state).admin_edit(request_id, payload).await?;
    Ok(Json(json!({ "ok": true, "request": request })))
}

/// GET `/admin/advances/periods` - The effective period of each type.
async fn list_periods(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let periods = repo(&state).periods(state.clock.today()).await?;
    Ok(Json(json!({ "ok": true, "periods": periods })))
}

/// PUT `/admin/advances/periods/{advance_type}` - Set dates and activation.
async fn configure_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(advance_type): Path<String>,
    Json(payload): Json<PeriodSettings>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let advance_type = AdvanceType::parse(&advance_type)
        .ok_or_else(|| ApiError::validation(format!("Unknown advance type: {advance_type}")))?;
    let period = repo(&state)
        .configure_period(advance_type, payload, state.clock.today())
        .await?;
    Ok(Json(json!({ "ok": true, "period": period })))
}

/// POST `/admin/advances/reset` - Start a new month: drop requests, close periods.
async fn monthly_reset(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let summary = repo(&state).monthly_reset().await?;
    info!(
        actor_id = %auth.account_id(),
        deleted_requests = summary.deleted_requests,
        deactivated_periods = summary.deactivated_periods,
        "advance cycle reset"
    );
    Ok(Json(json!({ "ok": true, "summary": summary })))
}

/// DELETE `/admin/advances/first` - Drop every FIRST request.
async fn delete_first_requests(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;
    let deleted = repo(&state).delete_first_requests().await?;
    Ok(Json(json!({ "ok": true, "deleted": deleted })))
}
