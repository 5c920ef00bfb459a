//! Unipile health-check server entry point.

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use unipile_health::config::Config;
use unipile_health::metrics;
use unipile_health::server::{self, StartupOptions};
use unipile_health::unipile::UnipileClient;

/// Liveness and Unipile connectivity health-check server.
#[derive(Parser, Debug)]
#[command(name = "unipile-health")]
#[command(about = "Serves a liveness check and a Unipile API health check")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// HTTP server port (overrides PORT, default 5000).
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not probe Unipile before accepting connections.
        #[arg(long)]
        skip_startup_probe: bool,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Probe Unipile once and print the answer.
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("unipile_health=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Some(Command::Serve {
            port,
            skip_startup_probe,
        }) => cmd_serve(port, skip_startup_probe).await,
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::Ping) => cmd_ping().await,
        None => cmd_serve(None, false).await,
    }
}

/// Load and validate configuration, logging the failure.
fn load_config() -> anyhow::Result<Config> {
    info!("Loading environment variables...");
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    Ok(config)
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("UNIPILE HEALTH - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Unipile DSN: {}", config.unipile_dsn);
    println!("  Probe URL: {}", config.accounts_url());
    println!("  API Key: {}", config.redacted_api_key());
    println!("  Timeout: {}s", config.unipile_timeout_secs);
    println!("  Port: {}", config.port);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Probe Unipile once and print the answer.
async fn cmd_ping() -> anyhow::Result<()> {
    let config = load_config()?;
    let client = UnipileClient::new(&config)?;

    println!("Pinging {} ...", client.accounts_url());
    match client.probe().await {
        Ok(r) => {
            println!("Unipile status code: {}", r.status_code);
            println!("Unipile response: {}", r.body);
            if r.ok {
                Ok(())
            } else {
                Err(anyhow::anyhow!("Unipile answered HTTP {}", r.status_code))
            }
        }
        Err(e) => {
            println!("Unipile ping FAILED: {}", e);
            Err(e.into())
        }
    }
}

/// Run the HTTP server.
async fn cmd_serve(port_override: Option<u16>, skip_startup_probe: bool) -> anyhow::Result<()> {
    // Fails before any port is bound
    let config = load_config()?;

    let metrics_handle = metrics::install_recorder()?;
    metrics::spawn_upkeep(metrics_handle.clone(), Duration::from_secs(5));

    let options = StartupOptions {
        port_override,
        skip_startup_probe,
        metrics: Some(metrics_handle),
    };

    server::run(&config, options).await.map_err(|e| {
        error!("Server failed: {}", e);
        e
    })?;

    Ok(())
}
