//! Server-side resume PDF rendering for `POST /api/generate-resume-pdf`.

pub mod latex;

use async_trait::async_trait;
use bytes::Bytes;

use crate::export::RenderError;
use crate::models::application::ResumePdfRequest;

pub use latex::{escape_latex, latex_document, LatexRenderer};

#[async_trait]
pub trait ResumePdfRenderer: Send + Sync {
    async fn render(&self, request: &ResumePdfRequest) -> Result<Bytes, RenderError>;
}
