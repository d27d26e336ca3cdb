//! Salary statement routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, patch},
};
use payroll_db::{StatementRepository, StatementScope};
use payroll_shared::types::PageRequest;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};

/// Creates the statement routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/statements", get(list_statements).delete(delete_all_statements))
        .route("/statements/latest", get(latest_statement))
        .route("/statements/{statement_id}", get(get_statement))
        .route("/statements/{statement_id}/notes", patch(update_notes))
}

/// Search parameter of the statement list.
#[derive(Debug, Default, Deserialize)]
pub struct StatementSearch {
    /// Name or employee id fragment.
    #[serde(default)]
    pub search: Option<String>,
}

/// Request body for editing statement notes.
#[derive(Debug, Deserialize)]
pub struct UpdateNotesRequest {
    /// New notes; surrounding whitespace is dropped.
    pub notes: String,
}

fn repo(state: &AppState) -> StatementRepository {
    StatementRepository::new((*state.db).clone())
}

/// GET `/statements/latest` - The caller's most recent statement.
async fn latest_statement(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let statement = repo(&state).latest_for_user(auth.account_id()).await?;
    Ok(Json(json!({ "ok": true, "statement": statement })))
}

/// GET `/statements` - Paginated statements.
///
/// Payroll managers see every active employee; others see their own.
async fn list_statements(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(search): Query<StatementSearch>,
    Query(page): Query<PageRequest>,
) -> ApiResult<impl IntoResponse> {
    let search = search.search.filter(|s| !s.trim().is_empty());
    let scope = if auth.can_manage_payroll() {
        StatementScope::AllEmployees { search }
    } else {
        StatementScope::Own {
            user_id: auth.account_id(),
            search,
        }
    };
    let page = repo(&state).list(&scope, &page).await?;
    Ok(Json(page))
}

/// GET `/statements/{statement_id}` - One statement, for its owner or a payroll manager.
async fn get_statement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(statement_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let statement = repo(&state)
        .find_by_id(statement_id)
        .await?
        .filter(|s| auth.can_manage_payroll() || s.user_id == auth.account_id())
        .ok_or_else(|| ApiError::not_found(format!("Statement {statement_id} not found")))?;
    Ok(Json(json!({ "ok": true, "statement": statement })))
}

/// PATCH `/statements/{statement_id}/notes` - Edit the notes of a statement.
async fn update_notes(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(statement_id): Path<Uuid>,
    Json(payload): Json<UpdateNotesRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require_payroll_manager()?;
    let statement = repo(&state)
        .update_notes(statement_id, &payload.notes, auth.account_id())
        .await?;
    Ok(Json(json!({ "ok": true, "statement": statement })))
}

/// DELETE `/statements` - Remove every statement.
async fn delete_all_statements(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    auth.require_payroll_manager()?;
    let deleted = repo(&state).delete_all(auth.account_id()).await?;
    info!(actor_id = %auth.account_id(), deleted, "all salary statements deleted");
    Ok(Json(json!({ "ok": true, "deleted": deleted })))
}
