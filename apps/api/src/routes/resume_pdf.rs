use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::errors::AppError;
use crate::export::sanitize_filename_stem;
use crate::models::application::ResumePdfRequest;
use crate::state::AppState;

/// POST /api/generate-resume-pdf
/// Responds with the PDF as an attachment named after the job title.
pub async fn generate_resume_pdf(
    State(state): State<AppState>,
    Json(req): Json<ResumePdfRequest>,
) -> Result<Response, AppError> {
    if req.resume_text.trim().is_empty() {
        return Err(AppError::Validation("Nothing to export.".to_string()));
    }

    let pdf = state
        .renderer
        .render(&req)
        .await
        .map_err(|e| AppError::Render(e.to_string()))?;

    let filename = format!("{}.pdf", sanitize_filename_stem(Some(req.job_title.as_str())));
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}
