//! HTTP surface of the relay.
//!
//! One HTML page with an upload and a download form, a binary-safe raw
//! download route, and a health check.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod page;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::{create_router, Endpoint};
pub use server::WebServer;
