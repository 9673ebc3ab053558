//! Metric sampling from the aggregation backend
//!
//! One sample is the average of a metric field across the documents reported
//! in a trailing lookback window, fetched from an Elasticsearch-compatible
//! search endpoint.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use crate::error::DetectError;

/// Maximum documents fetched per query; the backend may report more matches
const PAGE_SIZE: u32 = 500;

/// Source of per-metric average samples
#[async_trait]
pub trait MetricSampler: Send + Sync {
    /// Average of `metric` over the trailing `lookback_hours` window
    async fn sample(&self, metric: &str, lookback_hours: u32) -> Result<Decimal, DetectError>;
}

/// Samples metric averages from an Elasticsearch index of device reports
pub struct ElasticsearchSampler {
    client: Client,
    search_url: Url,
}

impl ElasticsearchSampler {
    /// Create a sampler querying `{base_url}/{index}/_search`
    pub fn new(client: Client, base_url: &str, index: &str) -> Result<Self, DetectError> {
        let base = Url::parse(base_url).map_err(|e| DetectError::InvalidConfig {
            reason: format!("invalid search URL '{}': {}", base_url, e),
        })?;
        let search_url =
            base.join(&format!("{}/_search", index))
                .map_err(|e| DetectError::InvalidConfig {
                    reason: format!("invalid index '{}': {}", index, e),
                })?;

        Ok(Self { client, search_url })
    }

    fn build_query(&self, lookback_hours: u32) -> Value {
        let start = Utc::now() - Duration::hours(i64::from(lookback_hours));
        json!({
            "size": PAGE_SIZE,
            "sort": [
                { "state.reported.timestamp": { "order": "desc" } },
            ],
            "query": {
                "range": {
                    "state.reported.timestamp": {
                        "gte": start.format("%Y-%m-%d %H:%M:%S").to_string(),
                        "lte": "now",
                        "format": "yyyy-MM-dd HH:mm:ss",
                    }
                }
            }
        })
    }
}

#[async_trait]
impl MetricSampler for ElasticsearchSampler {
    async fn sample(&self, metric: &str, lookback_hours: u32) -> Result<Decimal, DetectError> {
        let query = self.build_query(lookback_hours);
        debug!(metric = %metric, lookback_hours = lookback_hours, "Querying search backend");

        let response = self
            .client
            .post(self.search_url.clone())
            .json(&query)
            .send()
            .await
            .map_err(|e| DetectError::data_source(metric, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DetectError::data_source(
                metric,
                format!("search returned {}: {}", status, body),
            ));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| DetectError::data_source(metric, e))?;

        average_from_hits(&body, metric, lookback_hours)
    }
}

/// Average the metric field across the fetched page, dividing by the
/// reported total hit count. When total exceeds the page size this
/// understates the true average; the original system behaves the same way,
/// so the divisor is kept as-is (see DESIGN.md).
fn average_from_hits(
    response: &SearchResponse,
    metric: &str,
    lookback_hours: u32,
) -> Result<Decimal, DetectError> {
    let total = response.hits.total;
    if total == 0 {
        return Err(DetectError::EmptyLookback {
            metric: metric.to_string(),
            lookback_hours,
        });
    }

    let mut sum = Decimal::ZERO;
    for hit in &response.hits.hits {
        let value = hit.source.state.reported.get(metric).ok_or_else(|| {
            DetectError::data_source(metric, "document missing reported metric field")
        })?;
        let value: Decimal = serde_json::from_value(value.clone())
            .map_err(|e| DetectError::data_source(metric, e))?;
        sum += value;
    }

    Ok(sum / Decimal::from(total))
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    total: u64,
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_source")]
    source: HitSource,
}

#[derive(Debug, Deserialize)]
struct HitSource {
    state: DeviceState,
}

#[derive(Debug, Deserialize)]
struct DeviceState {
    reported: serde_json::Map<String, Value>,
}
