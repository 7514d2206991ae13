use std::sync::Arc;

use crate::catalog::Job;
use crate::config::Config;
use crate::render::ResumePdfRenderer;
use crate::store::ApplicationStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Jobs open for applications. Fixed for the process lifetime.
    pub catalog: Arc<Vec<Job>>,
    pub store: Arc<dyn ApplicationStore>,
    /// Pluggable PDF renderer. Default: LatexRenderer with structured fallback.
    pub renderer: Arc<dyn ResumePdfRenderer>,
}
