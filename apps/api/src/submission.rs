// Submission Client
// The only place that talks to the job-board backend. Both operations are safe to
// re-invoke after a failure. Response bodies are never trusted to be JSON: the HTTP
// status decides success and the body only contributes an optional `message`.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::debug;

use crate::models::application::{ApplicationRequest, ResumePdfRequest, ServerMessage};

pub const EXPORT_PDF_PATH: &str = "/api/generate-resume-pdf";
pub const APPLICATIONS_PATH: &str = "/api/applications";

pub const SUBMIT_FAILURE_MESSAGE: &str = "Failed to submit application. Please try again.";
pub const SUBMIT_SUCCESS_MESSAGE: &str = "Optimized resume saved and application submitted.";
pub const EXPORT_FAILURE_MESSAGE: &str = "Failed to generate PDF";
pub const EXPORT_NETWORK_FAILURE_MESSAGE: &str =
    "Failed to generate PDF. Make sure server pdflatex is available.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const LOG_PREVIEW_CHARS: usize = 300;

// ────────────────────────────────────────────────────────────────────────────
// Base URL resolution
// ────────────────────────────────────────────────────────────────────────────

/// Where API requests go: a configured origin, or same-origin relative paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiBase {
    origin: Option<String>,
}

impl ApiBase {
    /// Blank origins mean same-origin. Trailing slashes are stripped.
    pub fn new(origin: Option<&str>) -> Self {
        let origin = origin
            .map(|o| o.trim().trim_end_matches('/'))
            .filter(|o| !o.is_empty())
            .map(str::to_string);
        Self { origin }
    }

    pub fn same_origin() -> Self {
        Self::default()
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// `<origin><path>` when an origin is configured, otherwise the bare path.
    pub fn url(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        match &self.origin {
            Some(origin) => format!("{origin}{path}"),
            None => path,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Response classification
// ────────────────────────────────────────────────────────────────────────────

/// Every way a remote call can end, with the "maybe JSON" ambiguity made explicit.
#[derive(Debug)]
pub enum RemoteResponse {
    /// 2xx with a parsable JSON object body.
    Body(ServerMessage),
    /// 2xx with an empty or unparsable body.
    NoBody,
    /// Non-2xx. `message` comes from the body when it parsed and carried one.
    HttpError { status: u16, message: Option<String> },
    /// The request never produced a response.
    NetworkError(reqwest::Error),
}

impl RemoteResponse {
    /// Classifies a finished request. Body read failures count as "no body".
    pub async fn classify(result: Result<reqwest::Response, reqwest::Error>) -> Self {
        let response = match result {
            Ok(r) => r,
            Err(e) => return RemoteResponse::NetworkError(e),
        };
        let status = response.status();
        let body = response.bytes().await.unwrap_or_default();
        let parsed = parse_message(&body);

        if status.is_success() {
            match parsed {
                Some(message) => RemoteResponse::Body(message),
                None => RemoteResponse::NoBody,
            }
        } else {
            RemoteResponse::HttpError {
                status: status.as_u16(),
                message: parsed.and_then(|m| m.message),
            }
        }
    }
}

/// Optimistic parse; anything that is not a JSON object with an optional string
/// `message` yields `None`. Empty messages are treated as absent.
fn parse_message(body: &[u8]) -> Option<ServerMessage> {
    serde_json::from_slice::<ServerMessage>(body)
        .ok()
        .map(|mut m| {
            m.message = m.message.filter(|s| !s.is_empty());
            m
        })
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("HTTP {status}: {}", message.as_deref().unwrap_or("no message"))]
    Http { status: u16, message: Option<String> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid request URL '{0}'")]
    InvalidUrl(String),
}

impl SubmissionError {
    /// The server-supplied message, when the failure came with one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            SubmissionError::Http { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SubmissionError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Outcome of a successful application submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub message: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct SubmissionClient {
    client: Client,
    base: ApiBase,
    /// Origin that relative paths resolve against (the page the client was served from).
    document_origin: Url,
}

impl SubmissionClient {
    pub fn new(base: ApiBase, document_origin: &str) -> Result<Self, SubmissionError> {
        let document_origin = Url::parse(document_origin)
            .map_err(|_| SubmissionError::InvalidUrl(document_origin.to_string()))?;
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base,
            document_origin,
        })
    }

    pub fn base(&self) -> &ApiBase {
        &self.base
    }

    /// Absolute URL for an API path.
    pub fn request_url(&self, path: &str) -> Result<Url, SubmissionError> {
        let target = self.base.url(path);
        self.document_origin
            .join(&target)
            .map_err(|_| SubmissionError::InvalidUrl(target))
    }

    /// POST /api/generate-resume-pdf. Returns the rendered PDF bytes.
    pub async fn generate_resume_pdf(
        &self,
        request: &ResumePdfRequest,
    ) -> Result<Bytes, SubmissionError> {
        let url = self.request_url(EXPORT_PDF_PATH)?;
        debug!("POST {url}");
        let response = self.client.post(url).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = parse_message(&body).and_then(|m| m.message);
            debug!("Resume PDF export failed with {status}");
            return Err(SubmissionError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let pdf = response.bytes().await?;
        debug!("Resume PDF export returned {} bytes", pdf.len());
        Ok(pdf)
    }

    /// POST /api/applications. Records a smart application.
    pub async fn submit_application(
        &self,
        request: &ApplicationRequest,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        debug!(
            "Submitting application for job {}; resume preview: {}",
            request.job_id,
            preview(&request.resume)
        );

        let url = self.request_url(APPLICATIONS_PATH)?;
        debug!("POST {url}");
        let sent = self.client.post(url).json(request).send().await;

        match RemoteResponse::classify(sent).await {
            RemoteResponse::Body(body) => Ok(SubmissionReceipt {
                message: body.message,
            }),
            RemoteResponse::NoBody => Ok(SubmissionReceipt::default()),
            RemoteResponse::HttpError { status, message } => {
                debug!("Application rejected with {status}: {message:?}");
                Err(SubmissionError::Http { status, message })
            }
            RemoteResponse::NetworkError(e) => Err(SubmissionError::Network(e)),
        }
    }
}

fn preview(text: &str) -> String {
    if text.is_empty() {
        return "<empty>".to_string();
    }
    text.chars().take(LOG_PREVIEW_CHARS).collect()
}
