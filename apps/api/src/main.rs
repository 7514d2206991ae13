use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobboard::catalog::default_catalog;
use jobboard::config::Config;
use jobboard::render::LatexRenderer;
use jobboard::routes::build_router;
use jobboard::state::AppState;
use jobboard::store::InMemoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting job board API v{}", env!("CARGO_PKG_VERSION"));

    let catalog = default_catalog();
    info!("Catalog loaded: {} jobs", catalog.len());

    let renderer = LatexRenderer::new(&config.pdflatex_bin);
    info!("Resume PDF renderer: {}", config.pdflatex_bin);

    // Build app state
    let state = AppState {
        config: config.clone(),
        catalog: Arc::new(catalog),
        store: Arc::new(InMemoryStore::new()),
        renderer: Arc::new(renderer),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
