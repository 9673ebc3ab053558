//! Error taxonomy for the storm detection agent

use thiserror::Error;

/// Errors produced by the sampling and dispatch pipeline
#[derive(Debug, Error)]
pub enum DetectError {
    /// Query to the aggregation backend failed (network, auth, malformed response)
    #[error("data source query failed for metric '{metric}': {reason}")]
    DataSource { metric: String, reason: String },

    /// Zero documents matched the lookback window; the average is undefined
    #[error("no documents for metric '{metric}' in the last {lookback_hours}h")]
    EmptyLookback { metric: String, lookback_hours: u32 },

    /// The notification transport rejected or failed the send
    #[error("notification dispatch failed: {reason}")]
    Dispatch { reason: String },

    /// Construction-time validation failure
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl DetectError {
    pub fn data_source(metric: impl Into<String>, reason: impl ToString) -> Self {
        Self::DataSource {
            metric: metric.into(),
            reason: reason.to_string(),
        }
    }

    pub fn dispatch(reason: impl ToString) -> Self {
        Self::Dispatch {
            reason: reason.to_string(),
        }
    }

    /// Whether a cycle hitting this error must discard its accumulated windows
    pub fn is_cycle_fatal(&self) -> bool {
        matches!(
            self,
            DetectError::DataSource { .. } | DetectError::EmptyLookback { .. }
        )
    }
}
