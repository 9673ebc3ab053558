//! Observability infrastructure for the storm detection agent
//!
//! Provides Prometheus metrics for the sampling/detection loop. Structured
//! logging itself goes through `tracing`; the subscriber is installed by the
//! binary.

use prometheus::{
    register_histogram, register_int_counter, register_int_gauge_vec, Histogram, IntCounter,
    IntGaugeVec,
};
use std::sync::OnceLock;

/// Histogram buckets for cycle latency (in seconds); cycles are dominated by
/// two network round-trips
const CYCLE_LATENCY_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<DetectorMetricsInner> = OnceLock::new();

struct DetectorMetricsInner {
    cycle_latency_seconds: Histogram,
    samples_collected: IntCounter,
    sampler_errors: IntCounter,
    storm_signals: IntCounter,
    notifications_sent: IntCounter,
    notifications_suppressed: IntCounter,
    dispatch_errors: IntCounter,
    detector_restarts: IntCounter,
    window_samples: IntGaugeVec,
}

impl DetectorMetricsInner {
    fn new() -> Self {
        Self {
            cycle_latency_seconds: register_histogram!(
                "storm_agent_cycle_latency_seconds",
                "Time spent in one sample-classify-dispatch cycle",
                CYCLE_LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register cycle_latency_seconds"),

            samples_collected: register_int_counter!(
                "storm_agent_samples_collected_total",
                "Total metric averages fetched from the search backend"
            )
            .expect("Failed to register samples_collected_total"),

            sampler_errors: register_int_counter!(
                "storm_agent_sampler_errors_total",
                "Total failed sample acquisitions"
            )
            .expect("Failed to register sampler_errors_total"),

            storm_signals: register_int_counter!(
                "storm_agent_storm_signals_total",
                "Total cycles where the compound storm condition held"
            )
            .expect("Failed to register storm_signals_total"),

            notifications_sent: register_int_counter!(
                "storm_agent_notifications_sent_total",
                "Total alerts dispatched to the transport"
            )
            .expect("Failed to register notifications_sent_total"),

            notifications_suppressed: register_int_counter!(
                "storm_agent_notifications_suppressed_total",
                "Total storm signals dropped by the cooldown throttle"
            )
            .expect("Failed to register notifications_suppressed_total"),

            dispatch_errors: register_int_counter!(
                "storm_agent_dispatch_errors_total",
                "Total alert dispatch attempts rejected by the transport"
            )
            .expect("Failed to register dispatch_errors_total"),

            detector_restarts: register_int_counter!(
                "storm_agent_detector_restarts_total",
                "Total supervised loop resets after a failed cycle"
            )
            .expect("Failed to register detector_restarts_total"),

            window_samples: register_int_gauge_vec!(
                "storm_agent_window_samples",
                "Samples currently accumulated per metric window",
                &["metric"]
            )
            .expect("Failed to register window_samples"),
        }
    }
}

/// Detector metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the same
/// underlying metrics.
#[derive(Clone)]
pub struct DetectorMetrics {
    _private: (),
}

impl Default for DetectorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorMetrics {
    /// Create a metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(DetectorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &DetectorMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_cycle_latency(&self, duration_secs: f64) {
        self.inner().cycle_latency_seconds.observe(duration_secs);
    }

    pub fn inc_samples_collected(&self) {
        self.inner().samples_collected.inc();
    }

    pub fn inc_sampler_errors(&self) {
        self.inner().sampler_errors.inc();
    }

    pub fn inc_storm_signals(&self) {
        self.inner().storm_signals.inc();
    }

    pub fn inc_notifications_sent(&self) {
        self.inner().notifications_sent.inc();
    }

    pub fn inc_notifications_suppressed(&self) {
        self.inner().notifications_suppressed.inc();
    }

    pub fn inc_dispatch_errors(&self) {
        self.inner().dispatch_errors.inc();
    }

    pub fn inc_detector_restarts(&self) {
        self.inner().detector_restarts.inc();
    }

    pub fn set_window_samples(&self, metric: &str, len: usize) {
        self.inner()
            .window_samples
            .with_label_values(&[metric])
            .set(len as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_handle_is_shared() {
        let a = DetectorMetrics::new();
        let b = DetectorMetrics::new();

        a.inc_storm_signals();
        b.inc_storm_signals();
        a.set_window_samples("temperature", 3);

        // Both handles feed the same registry without panicking on
        // double registration.
        let families = prometheus::gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "storm_agent_storm_signals_total"));
    }
}
