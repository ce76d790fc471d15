//! filerelay - two-way file relay over HTTP.
//!
//! Uploads are stored flat under one storage root as
//! `{tag}_{YYYYMMDD_HHMMSS}_{sanitized original name}` and fetched back by
//! that name. Requested names are reduced to their final component before
//! they touch the filesystem.

pub mod config;
pub mod datetime;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use error::{RelayError, Result};
pub use file::{build_storage_name, resolve_path, FileStorage, StoredFile};
pub use web::WebServer;
