use axum::{extract::State, Json};

use crate::catalog::Job;
use crate::state::AppState;

/// GET /api/jobs
pub async fn list_jobs(State(state): State<AppState>) -> Json<Vec<Job>> {
    Json(state.catalog.to_vec())
}
