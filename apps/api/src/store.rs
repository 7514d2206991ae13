//! Application storage for the reference backend. In-memory only; nothing survives a restart.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::clock::lock;
use crate::models::application::{ApplicationRequest, SubmissionRecord};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("duplicate application")]
    Duplicate,

    #[error("Invalid appliedAt timestamp '{0}'")]
    InvalidTimestamp(String),
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert(
        &self,
        request: ApplicationRequest,
        received_at: DateTime<Utc>,
    ) -> Result<SubmissionRecord, StoreError>;

    async fn list(&self) -> Vec<SubmissionRecord>;
}

#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<SubmissionRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApplicationStore for InMemoryStore {
    /// Rejects a second application to the same job with an identical resume.
    async fn insert(
        &self,
        request: ApplicationRequest,
        received_at: DateTime<Utc>,
    ) -> Result<SubmissionRecord, StoreError> {
        let applied_at = DateTime::parse_from_rfc3339(&request.applied_at)
            .map_err(|_| StoreError::InvalidTimestamp(request.applied_at.clone()))?
            .with_timezone(&Utc);

        let mut records = lock(&self.records);
        if records
            .iter()
            .any(|r| r.job_id == request.job_id && r.resume == request.resume)
        {
            return Err(StoreError::Duplicate);
        }

        let record = SubmissionRecord {
            id: Uuid::new_v4(),
            job_id: request.job_id,
            job_title: request.job_title,
            company: request.company,
            applied_at,
            received_at,
            mode: request.mode,
            resume: request.resume,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn list(&self) -> Vec<SubmissionRecord> {
        lock(&self.records).clone()
    }
}
