// Smart Apply content source.
// The "optimized" resume is a deterministic template over the job posting, not a model call.

pub mod template;

pub use template::{optimized_resume, SMART_GENERATION_DELAY};
