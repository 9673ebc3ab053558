//! Storm detection agent library
//!
//! This crate provides the core functionality for:
//! - Sampling metric averages from a search backend
//! - Fixed-size sliding windows over recent samples
//! - Monotonic trend classification (decaying / raising)
//! - The compound storm trigger and the throttled alert dispatch
//! - Health checks and observability

pub mod detector;
pub mod error;
pub mod health;
pub mod notifier;
pub mod observability;
pub mod sampler;
pub mod throttle;
pub mod trend;
pub mod trigger;
pub mod window;

pub use detector::{CycleOutcome, DetectConfig, DetectLoop, METRIC_LIGHT, METRIC_TEMPERATURE};
pub use error::DetectError;
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use notifier::{Notifier, WebhookNotifier};
pub use observability::DetectorMetrics;
pub use sampler::{ElasticsearchSampler, MetricSampler};
pub use throttle::{NotificationThrottle, ThrottleDecision};
pub use trigger::{assess, StormAssessment};
pub use window::SampleWindow;
