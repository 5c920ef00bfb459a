//! Startup sequence and HTTP listen loop.
//!
//! Startup runs in a fixed order:
//!
//! ```text
//! validate config -> build client -> startup probe (logged) -> bind -> serve
//! ```
//!
//! Everything before the bind lives in [`prepare`], so a configuration error
//! returns before any port is taken. A failed startup probe is only logged.

use std::net::SocketAddr;

use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::error::{ProbeError, Result};
use crate::unipile::{UnipileClient, UpstreamResponse};
use crate::utils::shutdown_signal;

/// Knobs for [`prepare`] that do not come from the environment.
#[derive(Clone, Default)]
pub struct StartupOptions {
    /// Port to use instead of `Config::port`.
    pub port_override: Option<u16>,
    /// Skip the diagnostic probe.
    pub skip_startup_probe: bool,
    /// Handle backing `/metrics`.
    pub metrics: Option<PrometheusHandle>,
}

/// A validated server ready to bind.
pub struct Prepared {
    /// Router with all routes and state attached.
    pub router: Router,
    /// Host-local address to listen on.
    pub addr: SocketAddr,
    /// Result of the startup probe, `None` when skipped.
    pub startup_probe: Option<std::result::Result<UpstreamResponse, ProbeError>>,
}

/// Validate config, build the client, run the startup probe and build the router.
///
/// Binds nothing.
pub async fn prepare(config: &Config, options: StartupOptions) -> Result<Prepared> {
    config.validate()?;
    let client = UnipileClient::new(config)?;

    info!("Configuration loaded successfully");
    info!("Probe URL: {}", client.accounts_url());

    let startup_probe = if options.skip_startup_probe {
        None
    } else {
        info!("Pinging Unipile on startup...");
        let result = client.probe().await;
        match &result {
            Ok(r) => {
                info!("Unipile status code: {}", r.status_code);
                info!("Unipile response: {}", r.body);
            }
            Err(e) => {
                warn!("Unipile ping FAILED: {}", e);
            }
        }
        Some(result)
    };

    let mut state = AppState::new(client);
    if let Some(handle) = options.metrics {
        state = state.with_metrics(handle);
    }

    let port = options.port_override.unwrap_or(config.port);

    Ok(Prepared {
        router: create_router(state),
        addr: SocketAddr::from(([127, 0, 0, 1], port)),
        startup_probe,
    })
}

/// Serve a router on an already-bound listener until SIGINT or SIGTERM.
pub async fn serve_on(listener: TcpListener, router: Router) -> Result<()> {
    info!("Starting server at http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Prepare, bind and serve.
pub async fn run(config: &Config, options: StartupOptions) -> Result<()> {
    let prepared = prepare(config, options).await?;
    let listener = TcpListener::bind(prepared.addr).await?;
    serve_on(listener, prepared.router).await
}
