//! Upstream response envelope.

use serde::Serialize;

/// What the Unipile API answered to a probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamResponse {
    /// True when the upstream status is 2xx.
    pub ok: bool,
    /// Upstream HTTP status code.
    pub status_code: u16,
    /// Upstream body as text, unparsed.
    pub body: String,
}

impl UpstreamResponse {
    /// Build an envelope from a status code and body.
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            ok: (200..300).contains(&status_code),
            status_code,
            body: body.into(),
        }
    }
}
