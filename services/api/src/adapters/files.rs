//! services/api/src/adapters/files.rs
//!
//! Filesystem implementation of the `FileStore` port. Resumes live as flat
//! files under one directory; the reference handed back to the core always
//! uses the fixed `uploads/resumes/...` wire prefix, while the directory
//! itself is configurable and served separately.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use taskhive_core::ports::{FileStore, PortError, PortResult};

/// The path prefix under which stored resumes are addressable, both in
/// stored references and in the public URL space.
pub const REFERENCE_PREFIX: &str = "uploads/resumes";

/// Stores resume blobs on the local filesystem.
#[derive(Clone)]
pub struct DiskFileAdapter {
    root: PathBuf,
}

impl DiskFileAdapter {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// References carry the wire prefix; on disk only the final component
    /// exists, directly under the root.
    fn path_for(&self, reference: &str) -> Option<PathBuf> {
        Path::new(reference)
            .file_name()
            .map(|name| self.root.join(name))
    }
}

#[async_trait]
impl FileStore for DiskFileAdapter {
    async fn save(&self, file_name: &str, data: &[u8]) -> PortResult<String> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| PortError::Unexpected(format!("Error saving file: {}", e)))?;
        let path = self.root.join(file_name);
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| PortError::Unexpected(format!("Error saving file: {}", e)))?;
        Ok(format!("{}/{}", REFERENCE_PREFIX, file_name))
    }

    async fn remove(&self, reference: &str) -> PortResult<()> {
        let Some(path) = self.path_for(reference) else {
            return Ok(());
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Unexpected(format!("Error removing file: {}", e))),
        }
    }
}
