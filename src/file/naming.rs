//! Storage name construction.
//!
//! Every upload is stored as `{tag}_{timestamp}_{sanitized original name}`.
//! The timestamp has one second resolution, so two uploads sharing the tag
//! and original name within the same second get the same storage name and
//! the later one replaces the earlier one.

use chrono::{DateTime, Utc};

use crate::datetime::storage_timestamp;

/// Tag used when the uploader did not supply one.
pub const DEFAULT_TAG: &str = "unknown";

/// Placeholder used when the original filename sanitizes to nothing.
pub const FALLBACK_FILENAME: &str = "file";

/// Longest tag kept in a storage name, in bytes.
pub const MAX_TAG_BYTES: usize = 64;

/// Longest single path component accepted by common filesystems, in bytes.
pub const MAX_NAME_BYTES: usize = 255;

/// Extensions longer than this are not preserved when a name is shortened.
const MAX_EXTENSION_BYTES: usize = 16;

/// Characters rejected by at least one common filesystem.
const ILLEGAL_CHARS: &[char] = &[':', '*', '?', '"', '<', '>', '|'];

/// Device names that Windows refuses as file names regardless of extension.
const WINDOWS_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

fn truncate_on_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Shorten `name` to at most `max_bytes`, keeping a short extension intact.
fn shorten_filename(name: &str, max_bytes: usize) -> String {
    if name.len() <= max_bytes {
        return name.to_string();
    }

    let (stem, extension) = match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= MAX_EXTENSION_BYTES => name.split_at(dot),
        _ => (name, ""),
    };

    let room = max_bytes.saturating_sub(extension.len());
    let stem = truncate_on_char_boundary(stem, room).trim_end_matches(|c: char| c == '.' || c == '_');
    format!("{stem}{extension}")
}

/// Reduce an untrusted filename to a single safe path component.
///
/// Separators become word breaks, whitespace runs become `_`, and only
/// ASCII letters, digits, `.`, `_` and `-` are kept. Leading and trailing
/// dots and underscores are trimmed, so the result is never `.`, `..` or a
/// hidden file. Names over [`MAX_NAME_BYTES`] are shortened, keeping the
/// extension. Returns [`FALLBACK_FILENAME`] when nothing survives.
pub fn sanitize_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if is_separator(c) { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let filtered: String = joined
        .chars()
        .filter(|&c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let trimmed = filtered.trim_matches(|c: char| c == '.' || c == '_');
    if trimmed.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }

    let stem = trimmed.split('.').next().unwrap_or_default();
    if WINDOWS_DEVICE_NAMES
        .iter()
        .any(|device| stem.eq_ignore_ascii_case(device))
    {
        return shorten_filename(&format!("_{trimmed}"), MAX_NAME_BYTES);
    }

    shorten_filename(trimmed, MAX_NAME_BYTES)
}

/// Normalize an uploader-supplied tag.
///
/// Unlike filenames, tags keep unicode; only separators (mapped to `_`),
/// control characters and filesystem-illegal characters are removed.
/// The result is cut to [`MAX_TAG_BYTES`] on a character boundary.
/// Absent, empty or fully stripped tags become [`DEFAULT_TAG`].
pub fn normalize_tag(tag: Option<&str>) -> String {
    let cleaned: String = tag
        .unwrap_or_default()
        .trim()
        .chars()
        .filter(|c| !c.is_control() && !ILLEGAL_CHARS.contains(c))
        .map(|c| if is_separator(c) { '_' } else { c })
        .collect();

    let cut = truncate_on_char_boundary(&cleaned, MAX_TAG_BYTES).trim_end();
    if cut.is_empty() {
        DEFAULT_TAG.to_string()
    } else {
        cut.to_string()
    }
}

/// Build the storage name for an upload.
///
/// `timezone` selects the wall clock used for the timestamp segment; see
/// [`storage_timestamp`]. The sanitized name is shortened as needed so the
/// whole storage name fits in [`MAX_NAME_BYTES`].
pub fn build_storage_name(
    tag: Option<&str>,
    original_name: &str,
    now: &DateTime<Utc>,
    timezone: &str,
) -> String {
    let prefix = format!(
        "{}_{}_",
        normalize_tag(tag),
        storage_timestamp(now, timezone)
    );
    let name = shorten_filename(
        &sanitize_filename(original_name),
        MAX_NAME_BYTES.saturating_sub(prefix.len()),
    );

    format!("{prefix}{name}")
}
