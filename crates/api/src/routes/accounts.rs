//! Account routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use payroll_db::AccountRepository;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};

/// Self-service routes, reachable before the default password is changed.
pub fn self_routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/me", get(me))
        .route("/accounts/me/password", post(change_password))
}

/// Routes that act on other accounts.
pub fn managed_routes() -> Router<AppState> {
    Router::new().route("/accounts/{account_id}/reset-password", post(reset_password))
}

/// Request body for a password change.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    /// New password.
    #[serde(default)]
    pub new_password: String,
    /// Same password again.
    #[serde(default)]
    pub confirm_password: String,
}

fn repo(state: &AppState) -> AccountRepository {
    AccountRepository::new((*state.db).clone())
}

/// GET `/accounts/me` - The caller's account.
async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    let account = repo(&state)
        .find_by_id(auth.account_id())
        .await?
        .ok_or_else(|| ApiError::not_found("Account not found"))?;
    Ok(Json(json!({
        "ok": true,
        "account": account,
        "full_name": account.full_name(),
    })))
}

/// POST `/accounts/me/password` - Replace the caller's password.
async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    repo(&state)
        .change_password(
            auth.account_id(),
            &payload.new_password,
            &payload.confirm_password,
        )
        .await?;
    Ok(Json(json!({ "ok": true, "msg": "Password changed" })))
}

/// POST `/accounts/{account_id}/reset-password` - Restore an employee's default password.
async fn reset_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    auth.require_payroll_manager()?;
    repo(&state)
        .reset_password(auth.account_id(), account_id)
        .await?;
    Ok(Json(json!({ "ok": true, "msg": "Password reset to the default" })))
}
