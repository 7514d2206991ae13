//! Wire types shared by the submission client and the reference API.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Job;
use crate::session::ApplyMode;

/// Contact details sent alongside a server-rendered resume. All optional in practice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
}

/// Body of `POST /api/generate-resume-pdf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumePdfRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub job_title: String,
    pub resume_text: String,
}

impl ResumePdfRequest {
    pub fn new(profile: &ApplicantProfile, job_title: Option<&str>, resume_text: &str) -> Self {
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            location: profile.location.clone(),
            job_title: job_title.unwrap_or_default().to_string(),
            resume_text: resume_text.to_string(),
        }
    }
}

/// Body of `POST /api/applications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRequest {
    pub job_id: String,
    pub job_title: String,
    pub company: String,
    /// ISO-8601 timestamp, millisecond precision, UTC `Z` suffix.
    pub applied_at: String,
    pub mode: ApplyMode,
    pub resume: String,
}

impl ApplicationRequest {
    pub fn smart(job: &Job, resume: String, applied_at: DateTime<Utc>) -> Self {
        Self {
            job_id: job.id.clone(),
            job_title: job.title.clone(),
            company: job.company.clone(),
            applied_at: applied_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            mode: ApplyMode::Smart,
            resume,
        }
    }
}

/// The optional structured part of any API response. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerMessage {
    #[serde(default)]
    pub message: Option<String>,
}

/// Success body of `POST /api/applications`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationResponse {
    pub message: String,
    pub id: Uuid,
}

/// A received application as held by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub job_id: String,
    pub job_title: String,
    pub company: String,
    pub applied_at: DateTime<Utc>,
    pub received_at: DateTime<Utc>,
    pub mode: ApplyMode,
    pub resume: String,
}
