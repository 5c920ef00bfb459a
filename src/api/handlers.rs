//! HTTP API handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use crate::unipile::UnipileClient;

/// Path of the upstream health route, advertised by `/`.
pub const UNIPILE_HEALTH_PATH: &str = "/health/unipile";

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Upstream prober, immutable after startup.
    pub client: Arc<UnipileClient>,
    /// Prometheus render handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(client: UnipileClient) -> Self {
        Self {
            client: Arc::new(client),
            metrics: None,
        }
    }

    /// Expose metrics through the given handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct HomeResponse {
    /// Always true.
    pub ok: bool,
    /// Human-readable status.
    pub message: &'static str,
    /// Where to look next.
    pub next_step: &'static str,
}

/// Upstream health envelope when a response was received.
#[derive(Debug, Serialize)]
pub struct UnipileHealthResponse {
    /// Upstream answered 2xx.
    pub ok: bool,
    /// Upstream status code.
    pub status_code: u16,
    /// Upstream body as text.
    pub response: String,
}

/// Upstream health envelope when no response was received.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always false.
    pub ok: bool,
    /// Error message.
    pub error: String,
}

/// Liveness handler - always returns 200.
pub async fn home() -> impl IntoResponse {
    Json(HomeResponse {
        ok: true,
        message: "unipile health server is running",
        next_step: UNIPILE_HEALTH_PATH,
    })
}

/// Upstream health handler - relays the Unipile status.
///
/// 200 when Unipile answered 2xx, Unipile's own status otherwise, and 500
/// when no response could be obtained.
pub async fn health_unipile(State(state): State<AppState>) -> Response {
    match state.client.probe().await {
        Ok(upstream) => {
            let status = if upstream.ok {
                StatusCode::OK
            } else {
                StatusCode::from_u16(upstream.status_code).unwrap_or(StatusCode::BAD_GATEWAY)
            };

            let body = UnipileHealthResponse {
                ok: upstream.ok,
                status_code: upstream.status_code,
                response: upstream.body,
            };

            (status, Json(body)).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                ok: false,
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// Prometheus scrape handler - 404 when no recorder is installed.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
