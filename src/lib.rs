//! Liveness and Unipile connectivity health-check server.
//!
//! The server exposes two read-only endpoints. `/` answers as long as the
//! process is up. `/health/unipile` forwards a single authenticated request
//! to the Unipile accounts API and relays the upstream status:
//!
//! ```text
//! GET /health/unipile
//!   -> GET {UNIPILE_DSN}/api/v1/accounts   (X-API-KEY, 15s timeout)
//!   <- 2xx        => 200              {"ok":true,"status_code":200,"response":"..."}
//!   <- non-2xx    => upstream status  {"ok":false,"status_code":401,"response":"..."}
//!   <- net error  => 500              {"ok":false,"error":"..."}
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`unipile`]: Upstream health prober
//! - [`api`]: HTTP routes and handlers
//! - [`metrics`]: Prometheus probe metrics
//! - [`server`]: Startup sequence and listen loop
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod server;
pub mod unipile;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
