use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use tracing::info;

use crate::catalog::find_job;
use crate::errors::AppError;
use crate::models::application::{ApplicationRequest, ApplicationResponse, SubmissionRecord};
use crate::state::AppState;
use crate::store::StoreError;

/// POST /api/applications
pub async fn submit_application(
    State(state): State<AppState>,
    Json(req): Json<ApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationResponse>), AppError> {
    if req.job_id.trim().is_empty() {
        return Err(AppError::Validation("jobId is required".to_string()));
    }
    if req.resume.trim().is_empty() {
        return Err(AppError::Validation("resume must not be empty".to_string()));
    }
    let job = find_job(&state.catalog, &req.job_id)
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", req.job_id)))?;
    let title = job.title.clone();

    let record = state
        .store
        .insert(req, Utc::now())
        .await
        .map_err(|e| match e {
            StoreError::Duplicate => AppError::Conflict(e.to_string()),
            StoreError::InvalidTimestamp(_) => AppError::Validation(e.to_string()),
        })?;

    info!(
        "Application {} recorded for job {} ({:?} mode)",
        record.id, record.job_id, record.mode
    );
    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse {
            message: format!("Application submitted for {title}!"),
            id: record.id,
        }),
    ))
}

/// GET /api/applications
pub async fn list_applications(State(state): State<AppState>) -> Json<Vec<SubmissionRecord>> {
    Json(state.store.list().await)
}
