//! Print-to-PDF fallback, the universally available last tier.
//!
//! The payload is escaped into a minimal preformatted HTML document, written into a
//! freshly opened browsing context, and that context's print dialog is invoked after a
//! short render delay. The context is never closed here; its lifetime belongs to the user.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::export::{DocumentRenderer, ExportArtifact, ExportRequest, RenderError};

/// Delay between writing the document and calling print, so layout can settle.
pub const PRINT_DELAY: Duration = Duration::from_millis(300);

/// Escapes text for embedding in HTML element content or attribute values.
pub fn escape_html(unsafe_text: &str) -> String {
    let mut escaped = String::with_capacity(unsafe_text.len());
    for c in unsafe_text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// The complete HTML document handed to the print dialog.
pub fn print_document(text: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>Resume</title></head>\
         <body><pre style=\"white-space:pre-wrap;font-family:Arial, Helvetica, sans-serif;font-size:12pt;\">{}</pre>\
         </body></html>",
        escape_html(text)
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Browsing context capability
// ────────────────────────────────────────────────────────────────────────────

/// A newly opened window/tab (or equivalent) that can show and print a document.
pub trait BrowsingContext: Send {
    fn write(&mut self, html: &str) -> Result<(), RenderError>;
    fn close_document(&mut self) -> Result<(), RenderError>;
    fn focus(&mut self);
    fn print(&mut self) -> Result<(), RenderError>;
}

pub trait BrowsingContextOpener: Send + Sync {
    /// Opens a new context, or `None` when the host refuses (popup blocked).
    fn open(&self, name: &str) -> Option<Box<dyn BrowsingContext>>;
}

/// Opens "contexts" as HTML files in a directory, ready for a browser's print-to-PDF.
pub struct HtmlFileOpener {
    dir: PathBuf,
}

impl HtmlFileOpener {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl BrowsingContextOpener for HtmlFileOpener {
    fn open(&self, name: &str) -> Option<Box<dyn BrowsingContext>> {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!("Cannot open print context in {}: {e}", self.dir.display());
            return None;
        }
        Some(Box::new(HtmlFileContext {
            path: self.dir.join(format!("{name}.html")),
            buffer: String::new(),
        }))
    }
}

struct HtmlFileContext {
    path: PathBuf,
    buffer: String,
}

impl BrowsingContext for HtmlFileContext {
    fn write(&mut self, html: &str) -> Result<(), RenderError> {
        self.buffer.push_str(html);
        Ok(())
    }

    fn close_document(&mut self) -> Result<(), RenderError> {
        std::fs::write(&self.path, &self.buffer)
            .map_err(|e| RenderError::Failed(format!("writing {}: {e}", self.path.display())))
    }

    fn focus(&mut self) {}

    fn print(&mut self) -> Result<(), RenderError> {
        info!("Print-ready document at {}", self.path.display());
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer
// ────────────────────────────────────────────────────────────────────────────

pub struct PrintFallbackRenderer {
    opener: Arc<dyn BrowsingContextOpener>,
    clock: Arc<dyn Clock>,
    print_delay: Duration,
}

impl PrintFallbackRenderer {
    pub fn new(opener: Arc<dyn BrowsingContextOpener>, clock: Arc<dyn Clock>) -> Self {
        Self {
            opener,
            clock,
            print_delay: PRINT_DELAY,
        }
    }
}

#[async_trait]
impl DocumentRenderer for PrintFallbackRenderer {
    fn name(&self) -> &'static str {
        "print"
    }

    async fn render(&self, request: &ExportRequest) -> Result<ExportArtifact, RenderError> {
        let html = print_document(&request.text);
        let mut context = self
            .opener
            .open(&request.filename_stem)
            .ok_or(RenderError::PopupBlocked)?;

        context.write(&html)?;
        context.close_document()?;
        context.focus();

        self.clock.schedule(
            self.print_delay,
            Box::new(move || {
                if let Err(e) = context.print() {
                    warn!("Print dialog failed: {e}");
                }
            }),
        );
        debug!("Print dialog scheduled in {}ms", self.print_delay.as_millis());

        Ok(ExportArtifact::PrintDialog)
    }
}
