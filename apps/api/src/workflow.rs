// Apply Workflow
// Drives the application session from user actions: schedules smart generation,
// captures preview selections, runs exports and submits applications. The session
// mutex is never held across an await; async work snapshots what it needs first.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::capture::{capture_selection, RegionHandle, SelectionProvider};
use crate::catalog::{default_catalog, find_job, Job};
use crate::clock::{lock, Clock, TimerHandle, TokioClock};
use crate::config::Config;
use crate::export::download::{download_blob, DirectoryDownloads, DownloadError, DownloadSink};
use crate::export::{
    ExportChain, ExportError, ExportOutcome, ExportRequest, HtmlFileOpener, PageLayout,
    PrintFallbackRenderer, ServerRenderer, StructuredRenderer,
};
use crate::generation::SMART_GENERATION_DELAY;
use crate::models::application::{ApplicantProfile, ApplicationRequest, ResumePdfRequest};
use crate::notify::{Notice, Notifier, TracingNotifier};
use crate::session::{ApplicationSession, ResumeFile, SessionError, SessionState};
use crate::submission::{
    ApiBase, SubmissionClient, SubmissionError, EXPORT_FAILURE_MESSAGE,
    EXPORT_NETWORK_FAILURE_MESSAGE, SUBMIT_FAILURE_MESSAGE, SUBMIT_SUCCESS_MESSAGE,
};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Unknown job '{0}'")]
    UnknownJob(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Download(#[from] DownloadError),
}

/// Collaborators the workflow is built from. Hosts swap any of these out.
pub struct WorkflowParts {
    pub catalog: Vec<Job>,
    pub clock: Arc<dyn Clock>,
    pub selection: Arc<dyn SelectionProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub exports: ExportChain,
    pub client: Arc<SubmissionClient>,
    pub downloads: Arc<dyn DownloadSink>,
    pub profile: ApplicantProfile,
}

pub struct ApplyWorkflow {
    session: Arc<Mutex<ApplicationSession>>,
    catalog: Vec<Job>,
    clock: Arc<dyn Clock>,
    selection: Arc<dyn SelectionProvider>,
    notifier: Arc<dyn Notifier>,
    exports: ExportChain,
    client: Arc<SubmissionClient>,
    downloads: Arc<dyn DownloadSink>,
    profile: ApplicantProfile,
    generation_timer: Mutex<Option<TimerHandle>>,
    preview_region: Mutex<Option<RegionHandle>>,
}

impl ApplyWorkflow {
    pub fn new(parts: WorkflowParts) -> Self {
        Self {
            session: Arc::new(Mutex::new(ApplicationSession::new())),
            catalog: parts.catalog,
            clock: parts.clock,
            selection: parts.selection,
            notifier: parts.notifier,
            exports: parts.exports,
            client: parts.client,
            downloads: parts.downloads,
            profile: parts.profile,
            generation_timer: Mutex::new(None),
            preview_region: Mutex::new(None),
        }
    }

    /// Production wiring: tokio timers, directory downloads and the export tiers
    /// enabled in `config`. Without a host notifier, notices go to the log.
    /// Must be called from within a tokio runtime.
    pub fn from_config(
        config: &Config,
        selection: Arc<dyn SelectionProvider>,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> Result<Self, WorkflowError> {
        let notifier = notifier.unwrap_or_else(|| Arc::new(TracingNotifier));
        let clock: Arc<dyn Clock> = Arc::new(TokioClock::new());
        let downloads: Arc<dyn DownloadSink> =
            Arc::new(DirectoryDownloads::new(&config.download_dir));
        let client = Arc::new(SubmissionClient::new(
            ApiBase::new(config.api_url.as_deref()),
            &config.document_origin(),
        )?);
        let profile = ApplicantProfile::default();

        let mut exports = ExportChain::new(Arc::clone(&downloads));
        if config.structured_pdf {
            exports = exports.with_strategy(StructuredRenderer::new(PageLayout {
                font: config.pdf_font,
                ..PageLayout::a4()
            }));
        }
        if config.server_pdf_tier {
            exports = exports.with_strategy(ServerRenderer::new(
                Arc::clone(&client),
                profile.clone(),
            ));
        }
        exports = exports.with_strategy(PrintFallbackRenderer::new(
            Arc::new(HtmlFileOpener::new(&config.download_dir)),
            Arc::clone(&clock),
        ));
        info!("Export chain: {}", exports.strategy_names().join(" -> "));

        Ok(Self::new(WorkflowParts {
            catalog: default_catalog(),
            clock,
            selection,
            notifier,
            exports,
            client,
            downloads,
            profile,
        }))
    }

    pub fn jobs(&self) -> &[Job] {
        &self.catalog
    }

    /// A copy of the current session for display.
    pub fn session(&self) -> ApplicationSession {
        lock(&self.session).clone()
    }

    pub fn state(&self) -> SessionState {
        lock(&self.session).state()
    }

    // ── Session transitions ─────────────────────────────────────────────────

    pub fn select_job(&self, job_id: &str) -> Result<Job, WorkflowError> {
        let job = find_job(&self.catalog, job_id)
            .cloned()
            .ok_or_else(|| WorkflowError::UnknownJob(job_id.to_string()))?;
        self.cancel_generation_timer();
        lock(&self.session).select_job(job.clone());
        debug!("Selected job {} ({})", job.id, job.title);
        Ok(job)
    }

    pub fn choose_manual(&self) -> Result<(), WorkflowError> {
        lock(&self.session).choose_manual()?;
        Ok(())
    }

    /// Enters smart mode and schedules the templated resume after the generation delay.
    pub fn choose_smart(&self) -> Result<(), WorkflowError> {
        let ticket = lock(&self.session).choose_smart()?;
        self.cancel_generation_timer();

        let session = Arc::clone(&self.session);
        let handle = self.clock.schedule(
            SMART_GENERATION_DELAY,
            Box::new(move || {
                if lock(&session).complete_generation(ticket) {
                    debug!("Smart resume generated");
                } else {
                    debug!("Dropped stale smart generation");
                }
            }),
        );
        *lock(&self.generation_timer) = Some(handle);
        Ok(())
    }

    pub fn attach_file(&self, file: ResumeFile) -> Result<(), WorkflowError> {
        let attached = lock(&self.session).attach_file(file);
        match attached {
            Ok(()) => Ok(()),
            Err(e @ SessionError::UnsupportedFile(_)) => {
                self.notifier.notify(Notice::error(e.to_string()));
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn remove_file(&self) -> Result<(), WorkflowError> {
        lock(&self.session).remove_file()?;
        Ok(())
    }

    pub fn cancel(&self) -> Result<(), WorkflowError> {
        lock(&self.session).cancel()?;
        self.cancel_generation_timer();
        Ok(())
    }

    pub fn reset(&self) {
        lock(&self.session).reset();
        self.cancel_generation_timer();
    }

    /// Completes a manual application. Without a file this is rejected without a notice;
    /// hosts keep the submit control disabled in that case.
    pub fn submit_manual(&self) -> Result<Job, WorkflowError> {
        let job = lock(&self.session).submit_manual()?;
        info!("Manual application submitted for job {}", job.id);
        self.notifier
            .notify(Notice::info(format!("Application submitted for {}!", job.title)));
        Ok(job)
    }

    // ── Preview selection ───────────────────────────────────────────────────

    /// Registers (or clears) the region that holds the generated resume preview.
    pub fn set_preview_region(&self, region: Option<RegionHandle>) {
        *lock(&self.preview_region) = region;
    }

    /// Pointer released inside the preview: capture the selection into the session.
    pub fn on_preview_pointer_up(&self) {
        let region = lock(&self.preview_region).clone();
        let text = capture_selection(self.selection.as_ref(), region.as_ref());
        if let Err(e) = lock(&self.session).set_selection(text) {
            debug!("Ignoring selection outside the preview: {e}");
        }
    }

    // ── Exports ─────────────────────────────────────────────────────────────

    /// Runs the export chain on the current payload (selection, else full resume).
    pub async fn download_pdf(&self) -> Result<ExportOutcome, WorkflowError> {
        let (payload, title) = self.export_snapshot();

        match self.exports.export(&payload, title.as_deref()).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.notifier.notify(Notice::error(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Renders the current payload on the server and downloads the result.
    /// Returns where the download landed.
    pub async fn export_server_pdf(&self) -> Result<String, WorkflowError> {
        let (payload, title) = self.export_snapshot();
        if payload.is_empty() {
            let err = SessionError::EmptyPayload;
            self.notifier.notify(Notice::error(err.to_string()));
            return Err(err.into());
        }

        let request = ExportRequest::new(payload, title.as_deref());
        let body = ResumePdfRequest::new(&self.profile, title.as_deref(), &request.text);

        let pdf = match self.client.generate_resume_pdf(&body).await {
            Ok(pdf) => pdf,
            Err(e) => {
                warn!("Server PDF export failed: {e}");
                let message = match &e {
                    SubmissionError::Http { message, .. } => message
                        .clone()
                        .unwrap_or_else(|| EXPORT_FAILURE_MESSAGE.to_string()),
                    _ => EXPORT_NETWORK_FAILURE_MESSAGE.to_string(),
                };
                self.notifier.notify(Notice::error(message));
                return Err(e.into());
            }
        };

        match download_blob(self.downloads.as_ref(), pdf, &request.filename()) {
            Ok(location) => Ok(location),
            Err(e) => {
                warn!("Saving server PDF failed: {e}");
                self.notifier
                    .notify(Notice::error(EXPORT_NETWORK_FAILURE_MESSAGE));
                Err(e.into())
            }
        }
    }

    // ── Smart submission ────────────────────────────────────────────────────

    /// Submits the current payload. Success resets the session; failure leaves it
    /// in the preview so the user can retry. Returns the confirmation shown.
    pub async fn submit_smart(&self) -> Result<String, WorkflowError> {
        let begun = lock(&self.session).begin_smart_submission();
        let submission = match begun {
            Ok(submission) => submission,
            Err(e @ SessionError::EmptyPayload) => {
                self.notifier.notify(Notice::error(e.to_string()));
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        let request =
            ApplicationRequest::smart(&submission.job, submission.resume, self.clock.now());

        match self.client.submit_application(&request).await {
            Ok(receipt) => {
                let message = receipt
                    .message
                    .unwrap_or_else(|| SUBMIT_SUCCESS_MESSAGE.to_string());
                if lock(&self.session).finish_smart_submission(submission.epoch) {
                    info!("Smart application submitted for job {}", submission.job.id);
                } else {
                    debug!("Session moved on during submission; leaving it as is");
                }
                self.notifier.notify(Notice::info(message.clone()));
                Ok(message)
            }
            Err(e) => {
                warn!("Smart application for job {} failed: {e}", submission.job.id);
                let message = e
                    .server_message()
                    .unwrap_or(SUBMIT_FAILURE_MESSAGE)
                    .to_string();
                self.notifier.notify(Notice::error(message));
                Err(e.into())
            }
        }
    }

    fn export_snapshot(&self) -> (String, Option<String>) {
        let session = lock(&self.session);
        (
            session.export_payload().unwrap_or_default().to_string(),
            session.selected_job().map(|job| job.title.clone()),
        )
    }

    fn cancel_generation_timer(&self) {
        if let Some(handle) = lock(&self.generation_timer).take() {
            self.clock.cancel(handle);
        }
    }
}
