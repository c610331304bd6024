//! crates/taskhive_core/src/resume.rs
//!
//! Validates and persists uploaded resumes and maps stored references to
//! fetchable URLs. Naming combines wall-clock milliseconds with a
//! process-wide counter so concurrent uploads of the same filename can
//! never land under one reference.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::domain::ResumeUpload;
use crate::error::{CoreError, CoreResult};
use crate::ports::FileStore;

/// The only accepted declared content kind for resumes.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

const FALLBACK_FILE_NAME: &str = "resume.pdf";

/// Stores resume artifacts and resolves their references.
///
/// Replaced references are orphaned, not deleted; cleaning them up is out of
/// scope here.
#[derive(Clone)]
pub struct ResumeManager {
    files: Arc<dyn FileStore>,
    public_base_url: String,
    sequence: Arc<AtomicU64>,
}

impl ResumeManager {
    pub fn new(files: Arc<dyn FileStore>, public_base_url: String) -> Self {
        Self {
            files,
            public_base_url,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Checks the declared content kind without touching the file store, so
    /// callers can validate ahead of other expensive pipeline steps.
    pub fn validate(&self, upload: &ResumeUpload) -> CoreResult<()> {
        if upload.content_type != PDF_CONTENT_TYPE {
            return Err(CoreError::Validation(
                "Only PDF files are allowed".to_string(),
            ));
        }
        Ok(())
    }

    /// Persists a validated upload and returns its stable reference.
    ///
    /// Fails with `Validation` before touching the file store when the
    /// declared kind is not PDF.
    pub async fn store(&self, upload: &ResumeUpload) -> CoreResult<String> {
        self.validate(upload)?;
        let file_name = self.unique_file_name(&upload.file_name);
        let reference = self.files.save(&file_name, &upload.data).await?;
        tracing::debug!(reference = %reference, "stored resume artifact");
        Ok(reference)
    }

    /// Removes a stored artifact; used to roll back a file write whose
    /// follow-up row mutation failed.
    pub async fn remove(&self, reference: &str) -> CoreResult<()> {
        self.files.remove(reference).await?;
        Ok(())
    }

    /// Maps a stored reference to an externally fetchable URL.
    ///
    /// An empty reference fails with `NotFound`; callers render that as
    /// "no resume on file" rather than an error page.
    pub fn resolve_url(&self, reference: &str) -> CoreResult<String> {
        if reference.is_empty() {
            return Err(CoreError::NotFound("No resume on file".to_string()));
        }
        Ok(format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            reference
        ))
    }

    /// `<millis>-<seq>_<basename>`: sortable by upload time, unique within
    /// the process even at equal timestamps. The client-supplied name is
    /// reduced to its final path component first.
    fn unique_file_name(&self, original: &str) -> String {
        let base = std::path::Path::new(original)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(FALLBACK_FILE_NAME);
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}_{}", Utc::now().timestamp_millis(), seq, base)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use bytes::Bytes;
    use tokio::sync::Mutex;

    use super::*;
    use crate::ports::PortResult;

    #[derive(Default)]
    struct MemFileStore {
        saved: Mutex<Vec<String>>,
        removed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl FileStore for MemFileStore {
        async fn save(&self, file_name: &str, _data: &[u8]) -> PortResult<String> {
            let reference = format!("uploads/resumes/{}", file_name);
            self.saved.lock().await.push(reference.clone());
            Ok(reference)
        }

        async fn remove(&self, reference: &str) -> PortResult<()> {
            self.removed.lock().await.push(reference.to_string());
            Ok(())
        }
    }

    fn pdf_upload(name: &str) -> ResumeUpload {
        ResumeUpload {
            file_name: name.to_string(),
            content_type: PDF_CONTENT_TYPE.to_string(),
            data: Bytes::from_static(b"%PDF-1.4"),
        }
    }

    fn manager(files: Arc<MemFileStore>) -> ResumeManager {
        ResumeManager::new(files, "http://localhost:3000".to_string())
    }

    #[tokio::test]
    async fn rejects_non_pdf_before_persisting() {
        let files = Arc::new(MemFileStore::default());
        let manager = manager(files.clone());
        let upload = ResumeUpload {
            content_type: "text/plain".to_string(),
            ..pdf_upload("resume.txt")
        };

        let err = manager.store(&upload).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(files.saved.lock().await.is_empty());
    }

    #[tokio::test]
    async fn same_filename_never_collides() {
        let files = Arc::new(MemFileStore::default());
        let manager = manager(files.clone());
        let upload = pdf_upload("resume.pdf");

        let first = manager.store(&upload).await.unwrap();
        let second = manager.store(&upload).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn client_paths_are_reduced_to_basenames() {
        let files = Arc::new(MemFileStore::default());
        let manager = manager(files.clone());
        let upload = pdf_upload("../../etc/resume.pdf");

        let reference = manager.store(&upload).await.unwrap();
        assert!(!reference.contains(".."));
        assert!(reference.ends_with("_resume.pdf"));
    }

    #[tokio::test]
    async fn resolve_url_joins_base_and_reference() {
        let files = Arc::new(MemFileStore::default());
        let manager = manager(files);

        let url = manager.resolve_url("uploads/resumes/1_a.pdf").unwrap();
        assert_eq!(url, "http://localhost:3000/uploads/resumes/1_a.pdf");
    }

    #[tokio::test]
    async fn resolve_url_rejects_empty_reference() {
        let files = Arc::new(MemFileStore::default());
        let manager = manager(files);

        let err = manager.resolve_url("").unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
