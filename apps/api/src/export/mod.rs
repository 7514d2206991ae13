// Export Strategy Chain
// Ordered PDF strategies: structured generation → (optional) server LaTeX → print-to-PDF.
// A failing strategy hands over to the next one; only the final failure reaches the user.

pub mod download;
pub mod metrics;
pub mod print;
pub mod server;
pub mod structured;
pub mod wrap;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::export::download::{download_blob, DownloadSink};

pub use metrics::{PageLayout, PdfFont};
pub use print::{escape_html, BrowsingContextOpener, HtmlFileOpener, PrintFallbackRenderer};
pub use server::ServerRenderer;
pub use structured::StructuredRenderer;

const DEFAULT_FILENAME_STEM: &str = "resume";

/// Strips every character outside `[A-Za-z0-9 _-]`. Falls back to `"resume"` when
/// nothing usable is left.
pub fn sanitize_filename_stem(title: Option<&str>) -> String {
    let stem: String = title
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();
    if stem.trim().is_empty() {
        DEFAULT_FILENAME_STEM.to_string()
    } else {
        stem
    }
}

/// The text to render plus naming metadata, fixed at the moment of the export click.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub text: String,
    pub job_title: Option<String>,
    pub filename_stem: String,
}

impl ExportRequest {
    pub fn new(text: impl Into<String>, job_title: Option<&str>) -> Self {
        Self {
            text: text.into(),
            job_title: job_title.map(str::to_string),
            filename_stem: sanitize_filename_stem(job_title),
        }
    }

    pub fn filename(&self) -> String {
        format!("{}.pdf", self.filename_stem)
    }
}

#[derive(Debug, Clone)]
pub enum ExportArtifact {
    /// Binary PDF to hand to the download sink.
    Pdf(Bytes),
    /// A print dialog was scheduled; the user saves the PDF from there.
    PrintDialog,
}

#[derive(Debug, Error)]
pub enum RenderError {
    /// The strategy's capability is missing. Silent fallthrough.
    #[error("{0} is not available")]
    Unavailable(&'static str),

    #[error(
        "Unable to open new window for print. Please allow popups or enable direct PDF download."
    )]
    PopupBlocked,

    #[error("{0}")]
    Failed(String),
}

/// Failures surfaced to the user once the chain gives up.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("Nothing to export as PDF.")]
    NothingToExport,

    #[error(
        "Unable to open new window for print. Please allow popups or enable direct PDF download."
    )]
    PopupBlocked,

    #[error("Failed to generate PDF.")]
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Downloaded {
        strategy: &'static str,
        filename: String,
        location: String,
    },
    PrintDialog {
        strategy: &'static str,
    },
}

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Short strategy name for logs and outcomes.
    fn name(&self) -> &'static str;

    async fn render(&self, request: &ExportRequest) -> Result<ExportArtifact, RenderError>;
}

pub struct ExportChain {
    strategies: Vec<Box<dyn DocumentRenderer>>,
    downloads: Arc<dyn DownloadSink>,
}

impl ExportChain {
    pub fn new(downloads: Arc<dyn DownloadSink>) -> Self {
        Self {
            strategies: Vec::new(),
            downloads,
        }
    }

    /// Appends a strategy. Strategies run in insertion order.
    pub fn with_strategy(mut self, strategy: impl DocumentRenderer + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Runs the chain for `text`. An empty payload is rejected before any strategy runs.
    pub async fn export(
        &self,
        text: &str,
        job_title: Option<&str>,
    ) -> Result<ExportOutcome, ExportError> {
        if text.is_empty() {
            return Err(ExportError::NothingToExport);
        }
        let request = ExportRequest::new(text, job_title);
        let mut last_error: Option<RenderError> = None;

        for strategy in &self.strategies {
            let name = strategy.name();
            let artifact = match strategy.render(&request).await {
                Ok(artifact) => artifact,
                Err(RenderError::Unavailable(what)) => {
                    debug!("Export strategy '{name}' skipped: {what} is not available");
                    last_error = Some(RenderError::Unavailable(what));
                    continue;
                }
                Err(e) => {
                    warn!("Export strategy '{name}' failed: {e}");
                    last_error = Some(e);
                    continue;
                }
            };

            match artifact {
                ExportArtifact::PrintDialog => {
                    info!("Export via '{name}': print dialog opened");
                    return Ok(ExportOutcome::PrintDialog { strategy: name });
                }
                ExportArtifact::Pdf(bytes) => {
                    let filename = request.filename();
                    match download_blob(self.downloads.as_ref(), bytes, &filename) {
                        Ok(location) => {
                            info!("Export via '{name}': saved {filename}");
                            return Ok(ExportOutcome::Downloaded {
                                strategy: name,
                                filename,
                                location,
                            });
                        }
                        Err(e) => {
                            warn!("Export strategy '{name}' could not save {filename}: {e}");
                            last_error = Some(RenderError::Failed(e.to_string()));
                        }
                    }
                }
            }
        }

        match last_error {
            Some(RenderError::PopupBlocked) => Err(ExportError::PopupBlocked),
            _ => Err(ExportError::Failed),
        }
    }
}
