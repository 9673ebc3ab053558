//! Storm detection loop
//!
//! Orchestrates the per-cycle pipeline on a fixed cadence: sample both
//! metrics, push into the sliding windows, classify trends, evaluate the
//! compound storm condition, and dispatch a throttled alert. A failed cycle
//! clears both windows and the loop keeps ticking; the original system's
//! restart-on-exception behavior is kept, made explicit and logged.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::time::{interval, Instant};
use tracing::{debug, error, info, warn};

use crate::error::DetectError;
use crate::notifier::Notifier;
use crate::observability::DetectorMetrics;
use crate::sampler::MetricSampler;
use crate::throttle::{NotificationThrottle, ThrottleDecision};
use crate::trigger::{assess, StormAssessment};
use crate::window::SampleWindow;

/// Metric field names in the device-reported documents
pub const METRIC_TEMPERATURE: &str = "temperature";
pub const METRIC_LIGHT: &str = "light";

const ALERT_SUBJECT: &str = "Storm alert";
const ALERT_BODY: &str = "Warning: sharp temperature rise and low luminosity detected, \
     high chance of a storm in the next minutes.";

/// Configuration for the detection loop
#[derive(Debug, Clone)]
pub struct DetectConfig {
    /// Sliding window capacity per metric
    pub window_len: usize,
    /// Lookback hours per sample average
    pub lookback_hours: u32,
    /// Delay between cycles (default: 10 seconds)
    pub poll_interval: Duration,
}

impl DetectConfig {
    pub fn new(window_len: usize, lookback_hours: u32) -> Self {
        Self {
            window_len,
            lookback_hours,
            poll_interval: Duration::from_secs(10),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// What one detection cycle amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No storm signal this cycle
    Quiet,
    /// Storm signal fired and the alert went out
    StormDispatched,
    /// Storm signal fired inside the cooldown; alert dropped
    StormSuppressed { elapsed_secs: i64 },
    /// Storm signal fired but the transport refused the send
    DispatchFailed,
}

/// The sampling/classification/dispatch loop
pub struct DetectLoop {
    sampler: Arc<dyn MetricSampler>,
    notifier: Arc<dyn Notifier>,
    config: DetectConfig,
    temperature: SampleWindow,
    light: SampleWindow,
    throttle: NotificationThrottle,
    metrics: DetectorMetrics,
}

impl DetectLoop {
    pub fn new(
        sampler: Arc<dyn MetricSampler>,
        notifier: Arc<dyn Notifier>,
        config: DetectConfig,
        throttle: NotificationThrottle,
        metrics: DetectorMetrics,
    ) -> Result<Self, DetectError> {
        if config.lookback_hours == 0 {
            return Err(DetectError::InvalidConfig {
                reason: "lookback hours must be at least 1".to_string(),
            });
        }
        let temperature = SampleWindow::new(config.window_len)?;
        let light = SampleWindow::new(config.window_len)?;

        Ok(Self {
            sampler,
            notifier,
            config,
            temperature,
            light,
            throttle,
            metrics,
        })
    }

    /// Run until the shutdown channel fires
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            interval_secs = self.config.poll_interval.as_secs(),
            window_len = self.config.window_len,
            lookback_hours = self.config.lookback_hours,
            "Starting storm detection loop"
        );

        let mut ticker = interval(self.config.poll_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let start = Instant::now();
                    self.tick().await;
                    self.metrics.observe_cycle_latency(start.elapsed().as_secs_f64());
                }
                _ = shutdown.recv() => {
                    info!("Shutting down storm detection loop");
                    break;
                }
            }
        }
    }

    /// One supervised cycle: errors reset the windows instead of killing the loop
    pub async fn tick(&mut self) -> Option<CycleOutcome> {
        match self.run_cycle().await {
            Ok(outcome) => {
                debug!(outcome = ?outcome, "Detection cycle complete");
                Some(outcome)
            }
            Err(e) => {
                error!(error = %e, "Detection cycle failed, resetting windows");
                self.metrics.inc_sampler_errors();
                self.metrics.inc_detector_restarts();
                self.reset();
                None
            }
        }
    }

    async fn run_cycle(&mut self) -> Result<CycleOutcome, DetectError> {
        let average_temperature = self
            .sampler
            .sample(METRIC_TEMPERATURE, self.config.lookback_hours)
            .await?;
        self.temperature.push(average_temperature);
        self.metrics.inc_samples_collected();
        self.metrics
            .set_window_samples(METRIC_TEMPERATURE, self.temperature.len());
        info!(
            metric = METRIC_TEMPERATURE,
            average = %average_temperature,
            window = ?self.temperature.values(),
            len = self.temperature.len(),
            "Sampled metric average"
        );

        let average_light = self
            .sampler
            .sample(METRIC_LIGHT, self.config.lookback_hours)
            .await?;
        self.light.push(average_light);
        self.metrics.inc_samples_collected();
        self.metrics
            .set_window_samples(METRIC_LIGHT, self.light.len());
        info!(
            metric = METRIC_LIGHT,
            average = %average_light,
            window = ?self.light.values(),
            len = self.light.len(),
            "Sampled metric average"
        );

        let assessment = assess(&self.temperature, &self.light);
        self.log_soft_warnings(&assessment);

        if !assessment.storm_detected() {
            return Ok(CycleOutcome::Quiet);
        }

        self.metrics.inc_storm_signals();
        error!(
            average_temperature = %average_temperature,
            temperature_window = ?self.temperature.values(),
            average_light = %average_light,
            light_window = ?self.light.values(),
            window_len = self.config.window_len,
            "High darkness and high temperature: storm signature detected"
        );

        Ok(self.dispatch_alert().await)
    }

    /// Informational side signals; they never gate the alert
    fn log_soft_warnings(&self, assessment: &StormAssessment) {
        if assessment.temperature_warning() {
            warn!(metric = METRIC_TEMPERATURE, "Temperature is high!");
        }
        if assessment.light_warning() {
            warn!(metric = METRIC_LIGHT, "Light is down!");
        }
    }

    /// Throttle-gated dispatch; transport failures are contained here
    async fn dispatch_alert(&mut self) -> CycleOutcome {
        match self.throttle.check(Utc::now()) {
            ThrottleDecision::Suppressed { elapsed_secs } => {
                info!(elapsed_secs = elapsed_secs, "Notification not sent: inside cooldown");
                self.metrics.inc_notifications_suppressed();
                CycleOutcome::StormSuppressed { elapsed_secs }
            }
            ThrottleDecision::Send => match self.notifier.send(ALERT_SUBJECT, ALERT_BODY).await {
                Ok(()) => {
                    self.throttle.mark_sent(Utc::now());
                    self.metrics.inc_notifications_sent();
                    CycleOutcome::StormDispatched
                }
                Err(e) => {
                    // Cooldown deliberately not consumed on a failed send
                    warn!(error = %e, "Alert dispatch failed");
                    self.metrics.inc_dispatch_errors();
                    CycleOutcome::DispatchFailed
                }
            },
        }
    }

    /// Discard all accumulated window state after a failed cycle
    fn reset(&mut self) {
        self.temperature.clear();
        self.light.clear();
        self.metrics.set_window_samples(METRIC_TEMPERATURE, 0);
        self.metrics.set_window_samples(METRIC_LIGHT, 0);
    }

    pub fn temperature_window(&self) -> &SampleWindow {
        &self.temperature
    }

    pub fn light_window(&self) -> &SampleWindow {
        &self.light
    }
}
