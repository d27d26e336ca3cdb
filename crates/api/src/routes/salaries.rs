//! Salary spreadsheet upload routes.
//!
//! An upload returns as soon as the file is staged; the client then polls
//! the progress endpoint until the job is `done` or `error`.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use bytes::Bytes;
use payroll_core::import::{ImportProgress, ImportStatus};
use payroll_db::StatementRepository;
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Creates the salary upload routes (requires auth middleware to be applied externally).
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/salaries/uploads",
            post(start_upload)
                .layer(DefaultBodyLimit::max(max_upload_bytes.saturating_add(MULTIPART_OVERHEAD))),
        )
        .route("/salaries/uploads/latest", get(latest_upload))
        .route("/salaries/uploads/{upload_id}", delete(cancel_upload))
        .route("/salaries/uploads/{upload_id}/progress", get(upload_progress))
}

/// Progress poll response.
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    /// Always true; unknown jobs use a separate body.
    pub ok: bool,
    /// Job progress.
    #[serde(flatten)]
    pub progress: ImportProgress,
}

/// POST `/salaries/uploads` - Stage a spreadsheet and start importing it.
async fn start_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    auth.require_payroll_manager()?;

    let mut upload: Option<(String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(e.body_text()))?;
        upload = Some((file_name, data));
        break;
    }

    let Some((file_name, data)) = upload.filter(|(name, data)| !name.is_empty() && !data.is_empty())
    else {
        return Err(ApiError::validation("No file selected"));
    };

    let upload_id = state
        .imports
        .start(&file_name, data, auth.account_id())
        .await?;

    info!(upload_id = %upload_id, uploader_id = %auth.account_id(), "salary upload accepted");
    Ok((
        StatusCode::OK,
        Json(json!({ "ok": true, "upload_id": upload_id })),
    ))
}

/// GET `/salaries/uploads/{upload_id}/progress` - Poll an import.
async fn upload_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(upload_id): Path<Uuid>,
) -> ApiResult<Response> {
    auth.require_payroll_manager()?;

    let progress = state.imports.poll(upload_id);
    if progress.status == ImportStatus::Unknown {
        return Ok(Json(json!({ "ok": false, "status": "unknown" })).into_response());
    }
    Ok(Json(ProgressResponse { ok: true, progress }).into_response())
}

/// DELETE `/salaries/uploads/{upload_id}` - Cancel a running import.
async fn cancel_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(upload_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    auth.require_payroll_manager()?;
    state.imports.cancel(upload_id)?;
    Ok(Json(json!({ "ok": true, "msg": "Cancellation requested" })))
}

/// GET `/salaries/uploads/latest` - Most recent completed upload.
async fn latest_upload(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    auth.require_payroll_manager()?;
    let repo = StatementRepository::new((*state.db).clone());
    let upload = repo.latest_upload().await?;
    Ok(Json(json!({ "ok": true, "upload": upload })))
}
