//! HTTP handlers.

pub mod file;
pub mod index;

pub use file::{download_file, get_file_raw, upload_file, DownloadQuery};
pub use index::index;

use crate::file::FileStorage;

/// Default request body limit (100MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 100 * 1024 * 1024;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Storage root, created before the server starts.
    pub storage: FileStorage,
    /// Maximum accepted request body in bytes.
    pub max_upload_size: usize,
}

impl AppState {
    /// Create a new application state.
    pub fn new(storage: FileStorage) -> Self {
        Self {
            storage,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }

    /// Set the maximum accepted request body in bytes.
    pub fn with_max_upload_size(mut self, bytes: usize) -> Self {
        self.max_upload_size = bytes;
        self
    }
}
