//! Startup sequence: config gate, startup probe, bind and serve.

use std::time::Duration;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;

use unipile_health::config::Config;
use unipile_health::error::{AppError, ConfigError, ProbeError};
use unipile_health::server::{self, StartupOptions};

use super::{get_raw, test_config, FakeUnipile};

/// A local port that nothing is listening on.
async fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn config_with(vars: &[(&str, &str)]) -> Config {
    Config::from_vars(
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Vec<_>>(),
    )
    .unwrap()
}

#[tokio::test]
async fn empty_api_key_fails_before_binding() {
    let port = free_port().await;
    let config = config_with(&[
        ("UNIPILE_DSN", "https://api.example.com"),
        ("UNIPILE_API_KEY", ""),
        ("PORT", &port.to_string()),
    ]);

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        server::run(&config, StartupOptions::default()),
    )
    .await
    .expect("startup should fail immediately");

    assert!(matches!(
        result,
        Err(AppError::Config(ConfigError::Missing("UNIPILE_API_KEY")))
    ));
    // Port is still free: nothing was bound.
    TcpListener::bind(("127.0.0.1", port)).await.unwrap();
}

#[tokio::test]
async fn missing_dsn_fails_prepare() {
    let config = config_with(&[("UNIPILE_API_KEY", "secret123")]);

    let result = server::prepare(&config, StartupOptions::default()).await;

    assert!(matches!(
        result,
        Err(AppError::Config(ConfigError::Missing("UNIPILE_DSN")))
    ));
}

#[tokio::test]
async fn unreachable_upstream_still_serves() {
    let dsn = format!("http://127.0.0.1:{}", free_port().await);
    let config = test_config(&dsn, 2);

    let prepared = server::prepare(&config, StartupOptions::default()).await.unwrap();
    assert!(matches!(
        prepared.startup_probe,
        Some(Err(ProbeError::Request { .. }))
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve_on(listener, prepared.router));

    let http = reqwest::Client::new();
    let home = http.get(format!("http://{}/", addr)).send().await.unwrap();
    assert_eq!(home.status().as_u16(), 200);
    let body: serde_json::Value = home.json().await.unwrap();
    assert_eq!(body["ok"], true);

    let health = http
        .get(format!("http://{}/health/unipile", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status().as_u16(), 500);
}

#[tokio::test]
async fn relative_dsn_starts_and_reports_500() {
    let config = config_with(&[
        ("UNIPILE_DSN", "api.example.com"),
        ("UNIPILE_API_KEY", "secret123"),
    ]);

    let prepared = server::prepare(&config, StartupOptions::default()).await.unwrap();
    assert!(matches!(
        prepared.startup_probe,
        Some(Err(ProbeError::InvalidUrl { .. }))
    ));

    let (status, _) = get_raw(prepared.router.clone(), "/").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get_raw(prepared.router, "/health/unipile").await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["ok"], false);
    assert!(json["error"].as_str().unwrap().contains("api.example.com"));
}

#[tokio::test]
async fn control_character_key_starts_and_reports_500() {
    let config = config_with(&[
        ("UNIPILE_DSN", "https://api.example.com"),
        ("UNIPILE_API_KEY", "bad\nkey"),
    ]);

    let prepared = server::prepare(&config, StartupOptions::default()).await.unwrap();
    assert!(matches!(
        prepared.startup_probe,
        Some(Err(ProbeError::InvalidApiKey))
    ));

    let (status, _) = get_raw(prepared.router, "/health/unipile").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn startup_probe_hits_upstream_once() {
    let fake = FakeUnipile::new(StatusCode::OK, r#"{"items":[]}"#);
    let dsn = fake.spawn().await;

    let prepared = server::prepare(&test_config(&dsn, 5), StartupOptions::default())
        .await
        .unwrap();

    let probe = prepared.startup_probe.unwrap().unwrap();
    assert!(probe.ok);
    assert_eq!(probe.body, r#"{"items":[]}"#);
    assert_eq!(fake.seen().len(), 1);
}

#[tokio::test]
async fn skipped_startup_probe_leaves_upstream_alone() {
    let fake = FakeUnipile::new(StatusCode::OK, "{}");
    let dsn = fake.spawn().await;
    let options = StartupOptions {
        skip_startup_probe: true,
        ..StartupOptions::default()
    };

    let prepared = server::prepare(&test_config(&dsn, 5), options).await.unwrap();

    assert!(prepared.startup_probe.is_none());
    assert!(fake.seen().is_empty());
}

#[tokio::test]
async fn listens_host_local_on_configured_port() {
    let config = test_config("https://api.example.com", 5);
    let options = StartupOptions {
        skip_startup_probe: true,
        ..StartupOptions::default()
    };
    let prepared = server::prepare(&config, options.clone()).await.unwrap();
    assert_eq!(prepared.addr.to_string(), "127.0.0.1:5000");

    let overridden = server::prepare(
        &config,
        StartupOptions {
            port_override: Some(8081),
            ..options
        },
    )
    .await
    .unwrap();
    assert_eq!(overridden.addr.port(), 8081);
}
