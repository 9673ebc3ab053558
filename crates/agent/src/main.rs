//! Storm detection agent
//!
//! Polls a search backend for recent temperature and light averages,
//! classifies both trends over a sliding window, and dispatches a throttled
//! alert when the storm signature holds.

use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use storm_agent_lib::{
    health::{components, HealthRegistry},
    DetectConfig, DetectLoop, DetectorMetrics, ElasticsearchSampler, NotificationThrottle,
    WebhookNotifier,
};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting storm-agent");

    let settings = config::Settings::from_cli(config::Cli::parse())?;
    info!(
        window_len = settings.window_len,
        lookback_hours = settings.lookback_hours,
        search_url = %settings.config.search_url,
        "Agent configured"
    );

    // Initialize health registry
    let health_registry = HealthRegistry::new();
    health_registry.register(components::SAMPLER).await;
    health_registry.register(components::DETECTOR).await;
    health_registry.register(components::NOTIFIER).await;

    // Initialize metrics
    let metrics = DetectorMetrics::new();

    // Shared HTTP client with a bounded timeout for both the search backend
    // and the webhook transport
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.config.http_timeout_secs))
        .build()?;

    let sampler = Arc::new(ElasticsearchSampler::new(
        http_client.clone(),
        &settings.config.search_url,
        &settings.config.search_index,
    )?);
    let notifier = Arc::new(WebhookNotifier::new(
        http_client,
        &settings.config.webhook_url,
    )?);

    let detect_config = DetectConfig::new(settings.window_len, settings.lookback_hours)
        .with_poll_interval(Duration::from_secs(settings.config.poll_interval_secs));
    let throttle = NotificationThrottle::new(Utc::now())
        .with_cooldown(ChronoDuration::seconds(settings.config.cooldown_secs));

    let detector = DetectLoop::new(sampler, notifier, detect_config, throttle, metrics.clone())?;

    // Create shared application state for the API server
    let app_state = Arc::new(api::AppState::new(health_registry.clone(), metrics));

    // Mark agent as ready after initialization
    health_registry.set_ready(true).await;

    // Start health and metrics server
    let api_handle = tokio::spawn(api::serve(settings.config.api_port, app_state));

    // Run the detection loop until SIGINT
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let detector_handle = tokio::spawn(detector.run(shutdown_rx));

    tokio::signal::ctrl_c().await?;
    info!("SIGINT received, shutting down");
    let _ = shutdown_tx.send(());

    detector_handle.await?;
    api_handle.abort();

    Ok(())
}
