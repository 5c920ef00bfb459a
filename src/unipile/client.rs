//! Unipile API client used for connectivity probes.

use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::Config;
use crate::error::ProbeError;
use crate::metrics::{self, ProbeOutcome};

use super::types::UpstreamResponse;

/// Header carrying the Unipile API key.
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Unipile API client.
#[derive(Debug, Clone)]
pub struct UnipileClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Accounts endpoint, already joined onto the base URL.
    accounts_url: String,
    /// API key sent on every request.
    api_key: String,
}

impl UnipileClient {
    /// Create a new client from config.
    ///
    /// The URL and key are not checked here; a malformed one surfaces as a
    /// failed probe.
    pub fn new(config: &Config) -> Result<Self, ProbeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.unipile_timeout_secs))
            .build()
            .map_err(ProbeError::Client)?;

        Ok(Self {
            http,
            accounts_url: config.accounts_url(),
            api_key: config.unipile_api_key.clone(),
        })
    }

    /// URL hit by [`probe`](Self::probe).
    pub fn accounts_url(&self) -> &str {
        &self.accounts_url
    }

    fn target(&self) -> Result<Url, ProbeError> {
        let invalid = |reason: String| ProbeError::InvalidUrl {
            url: self.accounts_url.clone(),
            reason,
        };

        let url = Url::parse(&self.accounts_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        Ok(url)
    }

    fn headers(&self) -> Result<HeaderMap, ProbeError> {
        let mut api_key =
            HeaderValue::from_str(&self.api_key).map_err(|_| ProbeError::InvalidApiKey)?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Call `GET /api/v1/accounts` once and report what came back.
    ///
    /// Any HTTP status is a successful probe; only failing to obtain a
    /// response (or its body) is an error.
    #[instrument(skip(self), fields(url = %self.accounts_url))]
    pub async fn probe(&self) -> Result<UpstreamResponse, ProbeError> {
        let start = Instant::now();

        let result = self.send().await;

        let outcome = match &result {
            Ok(r) if r.ok => ProbeOutcome::Success,
            Ok(_) => ProbeOutcome::UpstreamError,
            Err(_) => ProbeOutcome::Failure,
        };
        metrics::record_probe(start, outcome);

        match &result {
            Ok(r) => debug!(status = r.status_code, ok = r.ok, "Unipile probe completed"),
            Err(e) => warn!(error = %e, timeout = e.is_timeout(), "Unipile probe failed"),
        }

        result
    }

    async fn send(&self) -> Result<UpstreamResponse, ProbeError> {
        let url = self.target()?;
        let headers = self.headers()?;

        let response = self
            .http
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|source| ProbeError::Request {
                url: self.accounts_url.clone(),
                source,
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(ProbeError::Body)?;

        Ok(UpstreamResponse::new(status, body))
    }
}
