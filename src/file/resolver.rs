//! Confinement of requested filenames to the storage root.
//!
//! Only the final component of a requested name is ever used. Both `/` and
//! `\` count as separators on every platform, so `..\..\secret.txt` sent to
//! a Unix host is reduced to `secret.txt` as well.

use std::path::{Path, PathBuf};

use crate::{RelayError, Result};

/// Extract the last path component of an untrusted name.
///
/// Returns `None` when nothing usable is left (empty input, trailing
/// separator, `.` or `..`).
pub fn base_name(requested: &str) -> Option<&str> {
    let base = requested
        .rsplit(&['/', '\\'][..])
        .next()
        .unwrap_or_default();

    match base {
        "" | "." | ".." => None,
        b if b.contains('\0') => None,
        b => Some(b),
    }
}

/// Build the path a requested name maps to, without touching the disk.
///
/// The returned path's parent is always exactly `storage_root`.
pub fn confine(storage_root: &Path, requested: &str) -> Option<PathBuf> {
    base_name(requested).map(|base| storage_root.join(base))
}

/// Resolve a requested name to an existing file inside `storage_root`.
///
/// Fails with [`RelayError::NotFound`] when the name is unusable or no
/// regular file exists at the confined path.
pub fn resolve_path(storage_root: &Path, requested: &str) -> Result<PathBuf> {
    let path = confine(storage_root, requested)
        .ok_or_else(|| RelayError::NotFound(format!("File: {requested}")))?;

    if path.is_file() {
        Ok(path)
    } else {
        Err(RelayError::NotFound(format!("File: {requested}")))
    }
}
