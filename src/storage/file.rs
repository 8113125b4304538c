//! File-system page sinks
//!
//! Two layouts are supported:
//! - a single shared file that every page overwrites
//! - a directory with one file per URL, named by the SHA-256 of the URL

use crate::storage::traits::{PageSink, WriteError, WriteResult};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
enum Layout {
    Shared(PathBuf),
    PerPage(PathBuf),
}

/// Page sink writing to the local file system
#[derive(Debug, Clone)]
pub struct FileSink {
    layout: Layout,
}

impl FileSink {
    /// Every page overwrites `path`
    pub fn shared(path: impl Into<PathBuf>) -> Self {
        Self {
            layout: Layout::Shared(path.into()),
        }
    }

    /// Each page gets its own file under `dir`
    ///
    /// The directory is created on the first write if it does not exist.
    pub fn per_page(dir: impl Into<PathBuf>) -> Self {
        Self {
            layout: Layout::PerPage(dir.into()),
        }
    }

    /// Returns the file a page named `name` is written to
    pub fn path_for(&self, name: &str) -> PathBuf {
        match &self.layout {
            Layout::Shared(path) => path.clone(),
            Layout::PerPage(dir) => dir.join(file_name_for(name)),
        }
    }

    async fn ensure_parent(&self, target: &Path, name: &str) -> WriteResult<()> {
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| WriteError::Io {
                        name: name.to_string(),
                        source,
                    })?;
            }
        }
        Ok(())
    }
}

/// Derives a stable file name from a URL
pub fn file_name_for(name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    format!("{}.html", hex::encode(hasher.finalize()))
}

#[async_trait]
impl PageSink for FileSink {
    async fn write(&self, name: &str, bytes: &[u8]) -> WriteResult<()> {
        let target = self.path_for(name);
        self.ensure_parent(&target, name).await?;

        tokio::fs::write(&target, bytes)
            .await
            .map_err(|source| WriteError::Io {
                name: name.to_string(),
                source,
            })?;

        tracing::trace!("Wrote {} bytes for {} to {}", bytes.len(), name, target.display());
        Ok(())
    }
}
