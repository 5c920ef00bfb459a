//! Unified error types for the health-check server.

use thiserror::Error;

/// Unified error type for the health-check server.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading or validation error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Upstream probe error.
    #[error("probe error: {0}")]
    Probe(#[from] ProbeError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment could not be deserialized.
    #[error("failed to read environment: {0}")]
    Env(#[from] envy::Error),

    /// Required variable is absent or empty.
    #[error("missing {0} in environment or .env")]
    Missing(&'static str),

    /// Any other out-of-range setting.
    #[error("{0}")]
    Invalid(String),
}

/// Errors raised while probing the Unipile API.
///
/// Non-2xx upstream responses are not errors; they are relayed as-is.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(reqwest::Error),

    /// Accounts URL is not an absolute http(s) URL.
    #[error("invalid Unipile URL {url:?}: {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// API key contains bytes that cannot be sent in a header.
    #[error("UNIPILE_API_KEY is not a valid header value")]
    InvalidApiKey,

    /// Request never produced a response (timeout, DNS, connection refused).
    #[error("request to {url} failed: {source}")]
    Request {
        /// Target URL.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Response arrived but its body could not be read.
    #[error("failed to read response body: {0}")]
    Body(reqwest::Error),
}

impl ProbeError {
    /// Whether the request hit the configured timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            ProbeError::Client(e) | ProbeError::Body(e) => e.is_timeout(),
            ProbeError::Request { source, .. } => source.is_timeout(),
            ProbeError::InvalidUrl { .. } | ProbeError::InvalidApiKey => false,
        }
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
