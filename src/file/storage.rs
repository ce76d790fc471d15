//! File storage for filerelay.
//!
//! All uploads live in one flat directory:
//! ```text
//! {root}/
//! ├── t1_20240309_140507_report.pdf
//! ├── unknown_20240309_141210_file
//! └── ...
//! ```
//! There is no index. The storage name is the key and the directory listing
//! is the catalog.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use super::naming::{build_storage_name, normalize_tag, sanitize_filename};
use super::resolver::resolve_path;
use super::StoredFile;
use crate::Result;

/// Storage root plus the naming settings applied to every upload.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Directory all files are written to and served from.
    root: PathBuf,
    /// Timezone for the timestamp segment of storage names.
    timezone: String,
}

/// An opened stored file, ready to be streamed.
#[derive(Debug)]
pub struct OpenedFile {
    /// Storage name (final path component).
    pub storage_name: String,
    /// Size in bytes.
    pub size: u64,
    /// Open handle, closed when dropped.
    pub file: File,
}

impl FileStorage {
    /// Create a storage rooted at `root`.
    ///
    /// The directory is created if it doesn't exist; an existing directory
    /// is left untouched.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;

        Ok(Self {
            root,
            timezone: "UTC".to_string(),
        })
    }

    /// Use the given timezone for storage name timestamps.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Get the storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Compute the storage name an upload would receive at `now`.
    pub fn storage_name(&self, tag: Option<&str>, original_name: &str, now: &DateTime<Utc>) -> String {
        build_storage_name(tag, original_name, now, &self.timezone)
    }

    /// Store an upload under its computed storage name.
    ///
    /// An existing file with the same storage name is replaced.
    pub async fn save(
        &self,
        tag: Option<&str>,
        original_name: &str,
        content: &[u8],
        now: DateTime<Utc>,
    ) -> Result<StoredFile> {
        let storage_name = self.storage_name(tag, original_name, &now);
        self.write(&storage_name, content).await?;

        Ok(StoredFile {
            storage_name,
            tag: normalize_tag(tag),
            uploaded_at: now,
            original_name: sanitize_filename(original_name),
            size: content.len() as u64,
        })
    }

    /// Write `content` to `{root}/{storage_name}`.
    ///
    /// A failed write removes whatever was partially written.
    async fn write(&self, storage_name: &str, content: &[u8]) -> Result<()> {
        let path = self.root.join(storage_name);

        let written = async {
            let mut file = File::create(&path).await?;
            file.write_all(content).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&path).await {
                tracing::debug!(error = %cleanup, path = %path.display(), "Partial file cleanup failed");
            }
            return Err(e.into());
        }

        Ok(())
    }

    /// Resolve a requested name to a path inside the root.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf> {
        resolve_path(&self.root, requested)
    }

    /// Open a stored file for streaming.
    pub async fn open(&self, requested: &str) -> Result<OpenedFile> {
        let path = self.resolve(requested)?;
        let file = File::open(&path).await?;
        let size = file.metadata().await?.len();
        let storage_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(OpenedFile {
            storage_name,
            size,
            file,
        })
    }
}
