//! File handling for filerelay.
//!
//! - Storage names: `{tag}_{timestamp}_{sanitized original name}`
//! - Confinement of requested names to the storage root
//! - The flat storage directory itself

mod naming;
mod resolver;
mod storage;

use chrono::{DateTime, Utc};

pub use naming::{
    build_storage_name, normalize_tag, sanitize_filename, DEFAULT_TAG, FALLBACK_FILENAME,
    MAX_NAME_BYTES, MAX_TAG_BYTES,
};
pub use resolver::{base_name, confine, resolve_path};
pub use storage::{FileStorage, OpenedFile};

/// A file written to the storage root.
///
/// Nothing besides the file itself is persisted; every field here except
/// `size` can be read back out of `storage_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Name of the file inside the storage root.
    pub storage_name: String,
    /// Normalized tag.
    pub tag: String,
    /// Upload time, truncated to seconds in the name.
    pub uploaded_at: DateTime<Utc>,
    /// Sanitized original filename.
    pub original_name: String,
    /// Content length in bytes.
    pub size: u64,
}
