//! Client-side downloads through a transient object URL.
//!
//! The sink mirrors the browser flow: materialize a blob URL, trigger the download,
//! then revoke the URL. Revocation is tied to a drop guard so it happens exactly
//! once whether or not the trigger succeeds.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::lock;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Unknown object URL: {0}")]
    UnknownUrl(String),

    #[error("Failed to write download: {0}")]
    Io(#[from] std::io::Error),
}

pub trait DownloadSink: Send + Sync {
    /// Registers `bytes` and returns a transient URL referencing them.
    fn create_object_url(&self, bytes: Bytes) -> Result<String, DownloadError>;

    /// Saves the object behind `url` as `filename`. Returns where it landed.
    fn trigger_download(&self, url: &str, filename: &str) -> Result<String, DownloadError>;

    /// Releases the object behind `url`.
    fn revoke_object_url(&self, url: &str);
}

struct ObjectUrl<'a> {
    sink: &'a dyn DownloadSink,
    url: String,
}

impl Drop for ObjectUrl<'_> {
    fn drop(&mut self) {
        self.sink.revoke_object_url(&self.url);
    }
}

/// Runs the create → trigger → revoke sequence for one download.
pub fn download_blob(
    sink: &dyn DownloadSink,
    bytes: Bytes,
    filename: &str,
) -> Result<String, DownloadError> {
    let object_url = ObjectUrl {
        url: sink.create_object_url(bytes)?,
        sink,
    };
    sink.trigger_download(&object_url.url, filename)
}

/// Saves downloads into a directory on disk.
pub struct DirectoryDownloads {
    dir: PathBuf,
    objects: Mutex<HashMap<String, Bytes>>,
}

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    /// Number of object URLs not yet revoked.
    pub fn live_objects(&self) -> usize {
        lock(&self.objects).len()
    }
}

impl DownloadSink for DirectoryDownloads {
    fn create_object_url(&self, bytes: Bytes) -> Result<String, DownloadError> {
        let url = format!("blob:{}", Uuid::new_v4());
        lock(&self.objects).insert(url.clone(), bytes);
        Ok(url)
    }

    fn trigger_download(&self, url: &str, filename: &str) -> Result<String, DownloadError> {
        let bytes = lock(&self.objects)
            .get(url)
            .cloned()
            .ok_or_else(|| DownloadError::UnknownUrl(url.to_string()))?;

        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        std::fs::write(&path, &bytes)?;

        info!("Downloaded {} bytes to {}", bytes.len(), path.display());
        Ok(path.display().to_string())
    }

    fn revoke_object_url(&self, url: &str) {
        if lock(&self.objects).remove(url).is_some() {
            debug!("Revoked {url}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records calls and optionally fails the trigger.
    #[derive(Default)]
    struct RecordingSink {
        fail_trigger: bool,
        revoked: Mutex<Vec<String>>,
    }

    impl DownloadSink for RecordingSink {
        fn create_object_url(&self, _bytes: Bytes) -> Result<String, DownloadError> {
            Ok("blob:test".to_string())
        }

        fn trigger_download(&self, url: &str, _filename: &str) -> Result<String, DownloadError> {
            if self.fail_trigger {
                Err(DownloadError::UnknownUrl(url.to_string()))
            } else {
                Ok("saved".to_string())
            }
        }

        fn revoke_object_url(&self, url: &str) {
            lock(&self.revoked).push(url.to_string());
        }
    }

    #[test]
    fn test_object_url_revoked_exactly_once_on_success() {
        let sink = RecordingSink::default();
        let location = download_blob(&sink, Bytes::from_static(b"%PDF"), "resume.pdf").unwrap();
        assert_eq!(location, "saved");
        assert_eq!(*lock(&sink.revoked), vec!["blob:test".to_string()]);
    }

    #[test]
    fn test_object_url_revoked_exactly_once_on_failure() {
        let sink = RecordingSink {
            fail_trigger: true,
            ..Default::default()
        };
        assert!(download_blob(&sink, Bytes::from_static(b"%PDF"), "resume.pdf").is_err());
        assert_eq!(lock(&sink.revoked).len(), 1);
    }

    #[test]
    fn test_directory_downloads_writes_file_and_releases_object() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectoryDownloads::new(dir.path().join("downloads"));

        let location = download_blob(
            &sink,
            Bytes::from_static(b"%PDF-1.5 test"),
            "Senior Frontend Developer.pdf",
        )
        .unwrap();

        let written = std::fs::read(dir.path().join("downloads/Senior Frontend Developer.pdf")).unwrap();
        assert_eq!(written, b"%PDF-1.5 test");
        assert!(location.ends_with("Senior Frontend Developer.pdf"));
        assert_eq!(sink.live_objects(), 0);
    }
}
