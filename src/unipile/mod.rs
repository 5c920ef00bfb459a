//! Unipile API connectivity probe.
//!
//! This module handles:
//! - The HTTP client that calls `GET /api/v1/accounts`
//! - The envelope describing the upstream answer

pub mod client;
pub mod types;

pub use client::UnipileClient;
pub use types::UpstreamResponse;
