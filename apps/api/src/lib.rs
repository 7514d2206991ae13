//! Job board resume export and application submission.
//!
//! The client-side workflow ([`workflow::ApplyWorkflow`]) drives job selection, manual
//! and smart apply modes, PDF export and submission. The reference backend
//! ([`routes::build_router`]) serves the catalog, records applications and renders
//! resumes to PDF.

pub mod capture;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod errors;
pub mod export;
pub mod generation;
pub mod models;
pub mod notify;
pub mod render;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
pub mod submission;
pub mod workflow;
