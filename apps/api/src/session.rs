//! Application session: the per-interaction state machine behind the apply panel.
//!
//! ```text
//! Idle ──select──▶ JobSelected ──manual──▶ ManualMode ──submit──▶ Idle
//!                      │   ▲
//!                      │   └────────cancel──────────┘
//!                      └──smart──▶ SmartPending ──generated──▶ SmartPreview ──submit ok──▶ Idle
//! ```
//!
//! Mode-specific data lives inside the mode variant, so an uploaded file can only exist
//! in manual mode and generated text only in smart mode.
//!
//! Every transition that invalidates in-flight async work (select, cancel, reset, a new
//! smart generation) bumps the session epoch. Generation and submission completions carry
//! the epoch they started under and are dropped when it no longer matches.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Job;
use crate::generation::optimized_resume;

/// Extensions accepted by the manual upload field.
pub const ACCEPTED_RESUME_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyMode {
    Manual,
    Smart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    JobSelected,
    ManualMode,
    SmartPending,
    SmartPreview,
}

/// A user-supplied resume file. Only the reference is held, not the contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    pub name: String,
    pub size_bytes: u64,
    pub media_type: Option<String>,
}

impl ResumeFile {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            media_type: None,
        }
    }

    pub fn has_accepted_extension(&self) -> bool {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| {
                ACCEPTED_RESUME_EXTENSIONS
                    .iter()
                    .any(|accepted| ext.eq_ignore_ascii_case(accepted))
            })
            .unwrap_or(false)
    }
}

/// Proof that a smart generation was scheduled under a given epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket {
    epoch: u64,
}

/// Everything the submission client needs for a smart submission, captured at click time.
#[derive(Debug, Clone, PartialEq)]
pub struct SmartSubmission {
    pub job: Job,
    pub resume: String,
    pub epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("No job selected")]
    NoJobSelected,

    #[error("Cannot {action} in state {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: SessionState,
    },

    #[error("Please upload a resume before submitting")]
    MissingFile,

    #[error("Unsupported resume file '{0}'. Upload a .pdf, .doc or .docx file.")]
    UnsupportedFile(String),

    #[error("Nothing to export.")]
    EmptyPayload,
}

#[derive(Debug, Clone, PartialEq)]
enum ModeState {
    Unset,
    Manual {
        file: Option<ResumeFile>,
    },
    SmartPending {
        ticket: GenerationTicket,
    },
    SmartPreview {
        resume: String,
        selection: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationSession {
    job: Option<Job>,
    mode: ModeState,
    epoch: u64,
}

impl Default for ApplicationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationSession {
    pub fn new() -> Self {
        Self {
            job: None,
            mode: ModeState::Unset,
            epoch: 0,
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        match (&self.job, &self.mode) {
            (None, _) => SessionState::Idle,
            (Some(_), ModeState::Unset) => SessionState::JobSelected,
            (Some(_), ModeState::Manual { .. }) => SessionState::ManualMode,
            (Some(_), ModeState::SmartPending { .. }) => SessionState::SmartPending,
            (Some(_), ModeState::SmartPreview { .. }) => SessionState::SmartPreview,
        }
    }

    pub fn selected_job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    pub fn mode(&self) -> Option<ApplyMode> {
        match self.mode {
            ModeState::Unset => None,
            ModeState::Manual { .. } => Some(ApplyMode::Manual),
            ModeState::SmartPending { .. } | ModeState::SmartPreview { .. } => {
                Some(ApplyMode::Smart)
            }
        }
    }

    pub fn uploaded_file(&self) -> Option<&ResumeFile> {
        match &self.mode {
            ModeState::Manual { file } => file.as_ref(),
            _ => None,
        }
    }

    pub fn generated_resume(&self) -> Option<&str> {
        match &self.mode {
            ModeState::SmartPreview { resume, .. } => Some(resume),
            _ => None,
        }
    }

    pub fn preview_visible(&self) -> bool {
        matches!(self.mode, ModeState::SmartPreview { .. })
    }

    pub fn captured_selection(&self) -> Option<&str> {
        match &self.mode {
            ModeState::SmartPreview { selection, .. } => selection.as_deref(),
            _ => None,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The manual submit button is enabled only once a file is attached.
    pub fn can_submit_manual(&self) -> bool {
        self.uploaded_file().is_some()
    }

    /// The text an export or smart submission would use right now.
    ///
    /// A non-empty captured selection always wins over the full generated resume.
    /// Returns `None` when both are empty.
    pub fn export_payload(&self) -> Option<&str> {
        self.captured_selection()
            .filter(|s| !s.is_empty())
            .or_else(|| self.generated_resume())
            .filter(|s| !s.is_empty())
    }

    // ── Transitions ─────────────────────────────────────────────────────────

    /// Selects a job from any state, discarding mode, file, preview and selection.
    pub fn select_job(&mut self, job: Job) {
        self.job = Some(job);
        self.mode = ModeState::Unset;
        self.epoch += 1;
    }

    pub fn choose_manual(&mut self) -> Result<(), SessionError> {
        self.require(SessionState::JobSelected, "choose manual apply")?;
        self.mode = ModeState::Manual { file: None };
        Ok(())
    }

    /// Enters `SmartPending`. The caller schedules generation and later redeems the ticket.
    pub fn choose_smart(&mut self) -> Result<GenerationTicket, SessionError> {
        self.require(SessionState::JobSelected, "choose smart apply")?;
        self.epoch += 1;
        let ticket = GenerationTicket { epoch: self.epoch };
        self.mode = ModeState::SmartPending { ticket };
        Ok(ticket)
    }

    /// Fills the preview with the templated resume. Returns `false` for a stale ticket.
    pub fn complete_generation(&mut self, ticket: GenerationTicket) -> bool {
        let current = matches!(&self.mode, ModeState::SmartPending { ticket: t } if *t == ticket);
        let Some(job) = self.job.as_ref().filter(|_| current) else {
            return false;
        };

        self.mode = ModeState::SmartPreview {
            resume: optimized_resume(job),
            selection: None,
        };
        true
    }

    pub fn attach_file(&mut self, file: ResumeFile) -> Result<(), SessionError> {
        self.require(SessionState::ManualMode, "attach a file")?;
        if !file.has_accepted_extension() {
            return Err(SessionError::UnsupportedFile(file.name));
        }
        self.mode = ModeState::Manual { file: Some(file) };
        Ok(())
    }

    pub fn remove_file(&mut self) -> Result<(), SessionError> {
        self.require(SessionState::ManualMode, "remove a file")?;
        self.mode = ModeState::Manual { file: None };
        Ok(())
    }

    /// Records the text captured from the preview. An empty string clears the selection.
    pub fn set_selection(&mut self, text: String) -> Result<(), SessionError> {
        let state = self.state();
        match &mut self.mode {
            ModeState::SmartPreview { selection, .. } => {
                *selection = if text.is_empty() { None } else { Some(text) };
                Ok(())
            }
            _ => Err(SessionError::InvalidTransition {
                action: "capture a selection",
                state,
            }),
        }
    }

    /// Leaves either mode, keeping the job selection.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        match self.state() {
            SessionState::ManualMode | SessionState::SmartPending | SessionState::SmartPreview => {
                self.mode = ModeState::Unset;
                self.epoch += 1;
                Ok(())
            }
            state => Err(SessionError::InvalidTransition {
                action: "cancel",
                state,
            }),
        }
    }

    /// Completes a manual application and resets the session. Returns the job applied to.
    pub fn submit_manual(&mut self) -> Result<Job, SessionError> {
        self.require(SessionState::ManualMode, "submit a manual application")?;
        if !self.can_submit_manual() {
            return Err(SessionError::MissingFile);
        }
        let job = self.job.clone().ok_or(SessionError::NoJobSelected)?;
        self.reset();
        Ok(job)
    }

    /// Captures the job and export payload for a smart submission. State is unchanged.
    pub fn begin_smart_submission(&self) -> Result<SmartSubmission, SessionError> {
        self.require(SessionState::SmartPreview, "submit a smart application")?;
        let job = self.job.clone().ok_or(SessionError::NoJobSelected)?;
        let resume = self
            .export_payload()
            .ok_or(SessionError::EmptyPayload)?
            .to_string();
        Ok(SmartSubmission {
            job,
            resume,
            epoch: self.epoch,
        })
    }

    /// Resets after a successful smart submission. Returns `false` (and leaves state alone)
    /// if the session moved on while the request was in flight.
    pub fn finish_smart_submission(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch {
            return false;
        }
        self.reset();
        true
    }

    pub fn reset(&mut self) {
        self.job = None;
        self.mode = ModeState::Unset;
        self.epoch += 1;
    }

    fn require(&self, expected: SessionState, action: &'static str) -> Result<(), SessionError> {
        match self.state() {
            SessionState::Idle => Err(SessionError::NoJobSelected),
            state if state == expected => Ok(()),
            state => Err(SessionError::InvalidTransition { action, state }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;

    fn frontend_job() -> Job {
        default_catalog().remove(0)
    }

    fn ml_job() -> Job {
        default_catalog().remove(1)
    }

    fn smart_preview() -> ApplicationSession {
        let mut session = ApplicationSession::new();
        session.select_job(frontend_job());
        let ticket = session.choose_smart().unwrap();
        assert!(session.complete_generation(ticket));
        session
    }

    /// One session per reachable state, with as much transient data as that state allows.
    fn sessions_in_every_state() -> Vec<ApplicationSession> {
        let idle = ApplicationSession::new();

        let mut selected = ApplicationSession::new();
        selected.select_job(frontend_job());

        let mut manual = selected.clone();
        manual.choose_manual().unwrap();
        manual
            .attach_file(ResumeFile::new("resume.pdf", 2048))
            .unwrap();

        let mut pending = selected.clone();
        pending.choose_smart().unwrap();

        let mut preview = smart_preview();
        preview.set_selection("React".to_string()).unwrap();

        vec![idle, selected, manual, pending, preview]
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = ApplicationSession::new();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.selected_job().is_none());
        assert!(session.mode().is_none());
        assert!(session.export_payload().is_none());
    }

    #[test]
    fn test_select_job_resets_transient_state_from_every_state() {
        for mut session in sessions_in_every_state() {
            let before = session.state();
            session.select_job(ml_job());
            assert_eq!(session.state(), SessionState::JobSelected, "from {before:?}");
            assert_eq!(session.selected_job().unwrap().id, "2");
            assert!(session.mode().is_none());
            assert!(session.uploaded_file().is_none());
            assert!(!session.preview_visible());
            assert!(session.generated_resume().is_none());
            assert!(session.captured_selection().is_none());
        }
    }

    #[test]
    fn test_mode_choice_requires_job_selected() {
        let mut session = ApplicationSession::new();
        assert_eq!(session.choose_manual(), Err(SessionError::NoJobSelected));
        assert_eq!(
            session.choose_smart().unwrap_err(),
            SessionError::NoJobSelected
        );

        session.select_job(frontend_job());
        session.choose_manual().unwrap();
        assert_eq!(
            session.choose_smart().unwrap_err(),
            SessionError::InvalidTransition {
                action: "choose smart apply",
                state: SessionState::ManualMode,
            }
        );
    }

    #[test]
    fn test_manual_submit_gated_on_file() {
        let mut session = ApplicationSession::new();
        session.select_job(frontend_job());
        session.choose_manual().unwrap();
        assert!(!session.can_submit_manual());
        assert_eq!(session.submit_manual(), Err(SessionError::MissingFile));
        assert_eq!(session.state(), SessionState::ManualMode);

        session
            .attach_file(ResumeFile::new("cv.docx", 10_000))
            .unwrap();
        assert!(session.can_submit_manual());

        session.remove_file().unwrap();
        assert!(!session.can_submit_manual());
        assert_eq!(session.submit_manual(), Err(SessionError::MissingFile));
    }

    #[test]
    fn test_manual_submit_resets_to_idle() {
        let mut session = ApplicationSession::new();
        session.select_job(frontend_job());
        session.choose_manual().unwrap();
        session
            .attach_file(ResumeFile::new("resume.PDF", 512))
            .unwrap();

        let job = session.submit_manual().unwrap();
        assert_eq!(job.title, "Senior Frontend Developer");
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.uploaded_file().is_none());
    }

    #[test]
    fn test_attach_rejects_unaccepted_extension() {
        let mut session = ApplicationSession::new();
        session.select_job(frontend_job());
        session.choose_manual().unwrap();
        assert_eq!(
            session.attach_file(ResumeFile::new("photo.png", 1)),
            Err(SessionError::UnsupportedFile("photo.png".to_string()))
        );
        assert!(!session.can_submit_manual());
    }

    #[test]
    fn test_smart_generation_fills_preview() {
        let session = smart_preview();
        assert_eq!(session.state(), SessionState::SmartPreview);
        assert!(session.preview_visible());
        let resume = session.generated_resume().unwrap();
        assert!(resume.contains("Senior Frontend Developer"));
        let first = resume.find("5+ years React experience").unwrap();
        let second = resume.find("TypeScript proficiency").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_stale_generation_ticket_is_dropped_after_cancel() {
        let mut session = ApplicationSession::new();
        session.select_job(frontend_job());
        let ticket = session.choose_smart().unwrap();
        session.cancel().unwrap();

        assert!(!session.complete_generation(ticket));
        assert_eq!(session.state(), SessionState::JobSelected);
    }

    #[test]
    fn test_stale_generation_ticket_is_dropped_after_reselecting_smart() {
        let mut session = ApplicationSession::new();
        session.select_job(frontend_job());
        let stale = session.choose_smart().unwrap();
        session.cancel().unwrap();
        let fresh = session.choose_smart().unwrap();

        assert!(!session.complete_generation(stale));
        assert_eq!(session.state(), SessionState::SmartPending);
        assert!(session.complete_generation(fresh));
    }

    #[test]
    fn test_cancel_keeps_job_and_discards_mode_state() {
        let mut manual = ApplicationSession::new();
        manual.select_job(frontend_job());
        manual.choose_manual().unwrap();
        manual
            .attach_file(ResumeFile::new("resume.pdf", 1))
            .unwrap();
        manual.cancel().unwrap();
        assert_eq!(manual.state(), SessionState::JobSelected);
        assert!(manual.uploaded_file().is_none());

        let mut preview = smart_preview();
        preview.cancel().unwrap();
        assert_eq!(preview.state(), SessionState::JobSelected);
        assert_eq!(preview.selected_job().unwrap().id, "1");
        assert!(preview.generated_resume().is_none());

        assert!(preview.cancel().is_err(), "nothing to cancel in JobSelected");
    }

    #[test]
    fn test_selection_overrides_generated_resume() {
        let mut session = smart_preview();
        let full = session.generated_resume().unwrap().to_string();
        assert_eq!(session.export_payload(), Some(full.as_str()));

        session
            .set_selection("KEY SKILLS MATCHED TO JOB".to_string())
            .unwrap();
        assert_eq!(session.export_payload(), Some("KEY SKILLS MATCHED TO JOB"));

        session.set_selection(String::new()).unwrap();
        assert_eq!(session.export_payload(), Some(full.as_str()));

        // Re-deriving never depends on the order of prior captures.
        session.set_selection("EXPERIENCE".to_string()).unwrap();
        session.set_selection("OPTIMIZED SUMMARY".to_string()).unwrap();
        assert_eq!(session.export_payload(), Some("OPTIMIZED SUMMARY"));
        assert_eq!(session.export_payload(), Some("OPTIMIZED SUMMARY"));
    }

    #[test]
    fn test_selection_outside_preview_state_is_rejected() {
        let mut session = ApplicationSession::new();
        session.select_job(frontend_job());
        assert!(session.set_selection("text".to_string()).is_err());
    }

    #[test]
    fn test_smart_submission_uses_payload_and_finish_resets() {
        let mut session = smart_preview();
        session.set_selection("TypeScript proficiency".to_string()).unwrap();

        let submission = session.begin_smart_submission().unwrap();
        assert_eq!(submission.resume, "TypeScript proficiency");
        assert_eq!(submission.job.id, "1");
        assert_eq!(session.state(), SessionState::SmartPreview);

        assert!(session.finish_smart_submission(submission.epoch));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_finish_smart_submission_ignores_stale_epoch() {
        let mut session = smart_preview();
        let submission = session.begin_smart_submission().unwrap();
        session.select_job(ml_job());

        assert!(!session.finish_smart_submission(submission.epoch));
        assert_eq!(session.state(), SessionState::JobSelected);
        assert_eq!(session.selected_job().unwrap().id, "2");
    }

    #[test]
    fn test_accepted_extensions() {
        assert!(ResumeFile::new("a.pdf", 1).has_accepted_extension());
        assert!(ResumeFile::new("a.Doc", 1).has_accepted_extension());
        assert!(ResumeFile::new("a.final.docx", 1).has_accepted_extension());
        assert!(!ResumeFile::new("resume", 1).has_accepted_extension());
        assert!(!ResumeFile::new("a.txt", 1).has_accepted_extension());
    }
}
