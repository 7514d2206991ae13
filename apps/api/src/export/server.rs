//! Server-side LaTeX rendering as an export strategy.
//!
//! Missing endpoints (404/501) mean the deployment has no renderer, so the chain
//! moves on quietly. Any other failure is logged and also falls through.

use std::sync::Arc;

use async_trait::async_trait;

use crate::export::{DocumentRenderer, ExportArtifact, ExportRequest, RenderError};
use crate::models::application::{ApplicantProfile, ResumePdfRequest};
use crate::submission::{SubmissionClient, SubmissionError, EXPORT_FAILURE_MESSAGE};

pub struct ServerRenderer {
    client: Arc<SubmissionClient>,
    profile: ApplicantProfile,
}

impl ServerRenderer {
    pub fn new(client: Arc<SubmissionClient>, profile: ApplicantProfile) -> Self {
        Self { client, profile }
    }
}

#[async_trait]
impl DocumentRenderer for ServerRenderer {
    fn name(&self) -> &'static str {
        "server"
    }

    async fn render(&self, request: &ExportRequest) -> Result<ExportArtifact, RenderError> {
        let body = ResumePdfRequest::new(&self.profile, request.job_title.as_deref(), &request.text);
        match self.client.generate_resume_pdf(&body).await {
            Ok(pdf) => Ok(ExportArtifact::Pdf(pdf)),
            Err(SubmissionError::Http {
                status: 404 | 501, ..
            }) => Err(RenderError::Unavailable("server PDF rendering")),
            Err(e) => Err(RenderError::Failed(
                e.server_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{EXPORT_FAILURE_MESSAGE}: {e}")),
            )),
        }
    }
}
