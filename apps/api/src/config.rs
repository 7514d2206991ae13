use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::export::PdfFont;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Origin of the job-board API. `None` means same-origin relative paths.
    pub api_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Where client-side downloads are written.
    pub download_dir: PathBuf,
    /// Enables the structured PDF tier of the export chain.
    pub structured_pdf: bool,
    /// Adds server-side LaTeX rendering as a tier of the export chain.
    pub server_pdf_tier: bool,
    pub pdflatex_bin: String,
    /// Base font of structured exports.
    pub pdf_font: PdfFont,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: None,
            port: 5001,
            rust_log: "info".to_string(),
            download_dir: PathBuf::from("./downloads"),
            structured_pdf: true,
            server_pdf_tier: false,
            pdflatex_bin: "pdflatex".to_string(),
            pdf_font: PdfFont::Courier,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        Ok(Config {
            api_url: lookup("API_URL").filter(|v| !v.trim().is_empty()),
            port: match lookup("PORT") {
                Some(port) => port
                    .parse::<u16>()
                    .context("PORT must be a valid port number")?,
                None => defaults.port,
            },
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            download_dir: lookup("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.download_dir),
            structured_pdf: optional_flag(&lookup, "STRUCTURED_PDF")?
                .unwrap_or(defaults.structured_pdf),
            server_pdf_tier: optional_flag(&lookup, "SERVER_PDF_TIER")?
                .unwrap_or(defaults.server_pdf_tier),
            pdflatex_bin: lookup("PDFLATEX_BIN").unwrap_or(defaults.pdflatex_bin),
            pdf_font: match lookup("PDF_FONT") {
                Some(raw) => parse_font(&raw)?,
                None => defaults.pdf_font,
            },
        })
    }

    /// The origin relative API paths resolve against: this server itself.
    pub fn document_origin(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }
}

fn optional_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<bool>> {
    lookup(key)
        .map(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(anyhow::anyhow!("{key} must be a boolean, got '{other}'")),
        })
        .transpose()
}

fn parse_font(raw: &str) -> Result<PdfFont> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "courier" => Ok(PdfFont::Courier),
        "helvetica" => Ok(PdfFont::Helvetica),
        other => Err(anyhow::anyhow!(
            "PDF_FONT must be 'courier' or 'helvetica', got '{other}'"
        )),
    }
}
