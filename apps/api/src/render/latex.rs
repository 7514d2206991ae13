//! LaTeX rendering via an external `pdflatex`.
//!
//! Each render gets its own temporary directory holding `resume.tex` and the
//! compiler's output. When the binary is missing the structured renderer takes over,
//! so the endpoint still answers with a PDF on hosts without a TeX install.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::export::{RenderError, StructuredRenderer};
use crate::models::application::ResumePdfRequest;
use crate::render::ResumePdfRenderer;

const TEX_FILE: &str = "resume.tex";
const PDF_FILE: &str = "resume.pdf";

/// Escapes LaTeX special characters in user text.
pub fn escape_latex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str(r"\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '~' => escaped.push_str(r"\textasciitilde{}"),
            '^' => escaped.push_str(r"\textasciicircum{}"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Builds the complete `.tex` source for a resume.
pub fn latex_document(request: &ResumePdfRequest) -> String {
    let mut doc = String::from(
        "\\documentclass[11pt]{article}\n\
         \\usepackage[margin=0.75in]{geometry}\n\
         \\usepackage[T1]{fontenc}\n\
         \\usepackage[utf8]{inputenc}\n\
         \\pagestyle{empty}\n\
         \\setlength{\\parindent}{0pt}\n\
         \\begin{document}\n",
    );

    if !request.name.trim().is_empty() {
        doc.push_str(&format!(
            "\\begin{{center}}{{\\Large\\bfseries {}}}\\end{{center}}\n",
            escape_latex(request.name.trim())
        ));
    }
    let contact = contact_line(request);
    if !contact.is_empty() {
        doc.push_str(&format!(
            "\\begin{{center}}{}\\end{{center}}\n",
            escape_latex(&contact)
        ));
    }
    if !request.job_title.trim().is_empty() {
        doc.push_str(&format!(
            "\\section*{{{}}}\n",
            escape_latex(request.job_title.trim())
        ));
    }

    for line in request.resume_text.lines() {
        if line.trim().is_empty() {
            doc.push_str("\\medskip\n\n");
        } else {
            // `\par` rather than `\\`, which would read a leading `[` on the next line
            // as its optional length argument.
            doc.push_str(&escape_latex(line));
            doc.push_str("\\par\n");
        }
    }

    doc.push_str("\\end{document}\n");
    doc
}

fn contact_line(request: &ResumePdfRequest) -> String {
    [&request.email, &request.phone, &request.location]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Plain-text rendition used when `pdflatex` is not installed.
fn fallback_text(request: &ResumePdfRequest) -> String {
    let mut header: Vec<String> = Vec::new();
    if !request.name.trim().is_empty() {
        header.push(request.name.trim().to_string());
    }
    let contact = contact_line(request);
    if !contact.is_empty() {
        header.push(contact);
    }
    if header.is_empty() {
        request.resume_text.clone()
    } else {
        format!("{}\n\n{}", header.join("\n"), request.resume_text)
    }
}

pub struct LatexRenderer {
    pdflatex_bin: PathBuf,
    fallback: StructuredRenderer,
}

impl LatexRenderer {
    pub fn new(pdflatex_bin: impl Into<PathBuf>) -> Self {
        Self {
            pdflatex_bin: pdflatex_bin.into(),
            fallback: StructuredRenderer::default(),
        }
    }

    async fn compile(&self, source: &str) -> Result<Option<Bytes>, RenderError> {
        let workdir = tempfile::tempdir()
            .map_err(|e| RenderError::Failed(format!("creating work directory: {e}")))?;
        let tex_path = workdir.path().join(TEX_FILE);
        tokio::fs::write(&tex_path, source)
            .await
            .map_err(|e| RenderError::Failed(format!("writing {TEX_FILE}: {e}")))?;

        let status = tokio::process::Command::new(&self.pdflatex_bin)
            .arg("-interaction=nonstopmode")
            .arg("-halt-on-error")
            .arg("-output-directory")
            .arg(workdir.path())
            .arg(&tex_path)
            .current_dir(workdir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await;

        let status = match status {
            Ok(status) => status,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "{} not found; falling back to structured rendering",
                    self.pdflatex_bin.display()
                );
                return Ok(None);
            }
            Err(e) => {
                return Err(RenderError::Failed(format!(
                    "starting {}: {e}",
                    self.pdflatex_bin.display()
                )))
            }
        };

        if !status.success() {
            return Err(RenderError::Failed(format!("pdflatex exited with {status}")));
        }

        let pdf = tokio::fs::read(workdir.path().join(PDF_FILE))
            .await
            .map_err(|e| RenderError::Failed(format!("reading {PDF_FILE}: {e}")))?;
        debug!("pdflatex produced {} bytes", pdf.len());
        Ok(Some(Bytes::from(pdf)))
    }
}

#[async_trait]
impl ResumePdfRenderer for LatexRenderer {
    async fn render(&self, request: &ResumePdfRequest) -> Result<Bytes, RenderError> {
        if let Some(pdf) = self.compile(&latex_document(request)).await? {
            info!("Rendered resume PDF with pdflatex");
            return Ok(pdf);
        }

        let fallback = self.fallback.clone();
        let text = fallback_text(request);
        let pdf = tokio::task::spawn_blocking(move || fallback.render_pdf(&text))
            .await
            .map_err(|e| RenderError::Failed(format!("render task failed: {e}")))??;
        Ok(Bytes::from(pdf))
    }
}
